/*
 * Single-threaded FIFO queue of work deferred to the next idle turn of the UI
 * event loop. Mutating a control from inside one of its own native message
 * handlers re-enters the control, so every such mutation is queued here and
 * run once the handler has returned.
 *
 * Tasks are not cancelable. Each closure captures the values it intends to
 * apply at the time it is queued, and strict FIFO order means later tasks
 * always observe state at least as fresh as earlier ones.
 */

use std::cell::RefCell;
use std::collections::VecDeque;

pub type IdleTask<C> = Box<dyn FnOnce(&C)>;

pub struct IdleQueue<C: ?Sized> {
    tasks: RefCell<VecDeque<IdleTask<C>>>,
}

impl<C: ?Sized> IdleQueue<C> {
    pub fn new() -> Self {
        Self {
            tasks: RefCell::new(VecDeque::new()),
        }
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce(&C) + 'static,
    {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /*
     * Runs the tasks that were queued when the turn began. Tasks queued while
     * the turn is running wait for the next turn. The queue is not borrowed
     * while a task runs.
     */
    pub fn run_turn(&self, context: &C) -> usize {
        let pending = self.len();
        let mut ran = 0;
        for _ in 0..pending {
            let next = self.tasks.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task(context);
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl<C: ?Sized> Default for IdleQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
