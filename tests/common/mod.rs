#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use argpat::spec::{ErrorCode, ErrorEntry, ErrorHandler};

/// Error handler that keeps every reported entry; clones share storage so
/// one copy can go to the processor while the test inspects another.
#[derive(Clone, Default)]
pub struct Recorder {
    entries: Rc<RefCell<Vec<ErrorEntry>>>,
}

impl Recorder {
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.entries.borrow().clone()
    }

    pub fn codes(&self) -> Vec<(usize, ErrorCode)> {
        self.entries
            .borrow()
            .iter()
            .map(|e| (e.arg_index, e.code))
            .collect()
    }
}

impl ErrorHandler for Recorder {
    fn handle(&self, errors: &[ErrorEntry], _exit_status: &mut i32) {
        self.entries.borrow_mut().extend_from_slice(errors);
    }
}

pub fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
