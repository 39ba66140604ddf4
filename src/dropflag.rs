//! This module is for testing only

use std::rc::Rc;
use std::cell::RefCell;

pub type DropFlag<T> = Rc<RefCell<T>>;

pub struct Droppable {
    pub dropflag: DropFlag<bool>,
}

impl Drop for Droppable {
    fn drop(&mut self) {
        *self.dropflag.borrow_mut() = true;
    }
}

/// What happened to all `Tracked` values sharing the same counters.
#[derive(Debug, Default)]
pub struct Counters {
    pub created: usize,
    pub clones: usize,
    pub drops: usize,
    /// Clone panics when this reaches zero.
    pub clones_until_panic: Option<usize>,
    /// `Default::default` panics when this reaches zero.
    pub defaults_until_panic: Option<usize>,
}

impl Counters {
    pub fn shared() -> DropFlag<Counters> {
        DropFlag::new(RefCell::new(Counters::default()))
    }

    pub fn live(&self) -> usize {
        self.created + self.clones - self.drops
    }
}

thread_local! {
    static DEFAULT_COUNTERS: RefCell<Option<DropFlag<Counters>>> = RefCell::new(None);
}

/// Routes `Tracked::default()` to `counters` for the current thread.
pub fn count_defaults_in(counters: &DropFlag<Counters>) {
    DEFAULT_COUNTERS.with(|c| *c.borrow_mut() = Some(counters.clone()));
}

/// Instrumented element: counts creation, clones and drops, and can be armed to panic.
#[derive(Debug)]
pub struct Tracked {
    pub value: i32,
    pub counters: DropFlag<Counters>,
}

impl Tracked {
    pub fn new(value: i32, counters: &DropFlag<Counters>) -> Tracked {
        counters.borrow_mut().created += 1;
        Tracked { value, counters: counters.clone() }
    }
}

fn tick(countdown: &mut Option<usize>) -> bool {
    match countdown {
        Some(0) => true,
        Some(n) => {
            *n -= 1;
            false
        },
        None => false,
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        let mut counters = self.counters.borrow_mut();
        if tick(&mut counters.clones_until_panic) {
            drop(counters);
            panic!("clone of {} failed", self.value);
        }
        counters.clones += 1;
        Tracked { value: self.value, counters: self.counters.clone() }
    }
}

impl Default for Tracked {
    fn default() -> Self {
        let counters = DEFAULT_COUNTERS.with(|c| c.borrow().clone())
            .expect("count_defaults_in was not called");
        let failed = tick(&mut counters.borrow_mut().defaults_until_panic);
        if failed {
            panic!("default construction failed");
        }
        Tracked::new(0, &counters)
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.borrow_mut().drops += 1;
    }
}

#[test]
fn dropflag() {
    let flag = DropFlag::new(RefCell::new(false));
    let droppable = Droppable { dropflag: flag.clone() };
    assert_eq!(false, *flag.borrow());
    std::mem::drop(droppable);
    assert_eq!(true, *flag.borrow());
}

#[test]
fn tracked_counts_and_panics() {
    let counters = Counters::shared();
    let a = Tracked::new(1, &counters);
    counters.borrow_mut().clones_until_panic = Some(1);
    let b = a.clone();
    let failed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| a.clone())).is_err();
    assert!(failed);
    drop(b);
    assert_eq!(1, counters.borrow().clones);
    assert_eq!(1, counters.borrow().live());
    drop(a);
    assert_eq!(0, counters.borrow().live());
}
