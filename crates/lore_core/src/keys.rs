use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::RandomState;
use hashbrown::HashMap;

thread_local! {
    static TIMER_KEYS: RefCell<HashMap<String, Rc<str>, RandomState>> =
        RefCell::new(HashMap::default());
    static TRIGGER_KEYS: RefCell<HashMap<String, Rc<str>, RandomState>> =
        RefCell::new(HashMap::default());
}

fn intern(table: &'static std::thread::LocalKey<RefCell<HashMap<String, Rc<str>, RandomState>>>, name: &str) -> Rc<str> {
    let lowered = name.to_ascii_lowercase();
    table.with(|t| {
        let mut t = t.borrow_mut();
        if let Some(existing) = t.get(&lowered) {
            return existing.clone();
        }
        let interned: Rc<str> = Rc::from(lowered.as_str());
        t.insert(lowered, interned.clone());
        interned
    })
}

/// Interned, case-folded name of a timer slot on an attachment host.
/// Acquiring the same name twice yields the same shared string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TimerKey(Rc<str>);

impl TimerKey {
    pub fn acquire(name: &str) -> Self {
        TimerKey(intern(&TIMER_KEYS, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Debug for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerKey({})", self.0)
    }
}

/// Interned, case-folded name of a script trigger.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TriggerKey(Rc<str>);

impl TriggerKey {
    pub fn acquire(name: &str) -> Self {
        TriggerKey(intern(&TRIGGER_KEYS, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

impl fmt::Debug for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TriggerKey({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_is_case_insensitive_and_shares_storage(){
        let a = TimerKey::acquire("Regen");
        let b = TimerKey::acquire("regen");
        assert_eq!(a, b);
        assert!(Rc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn timer_and_trigger_namespaces_are_separate() {
        let t = TimerKey::acquire("tick");
        let g = TriggerKey::acquire("tick");
        assert_eq!(t.as_str(), g.as_str());
        assert_eq!(t.to_string(), "%tick");
        assert_eq!(g.to_string(), "@tick");
    }
}
