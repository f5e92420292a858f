//! Plugin hooks into a run.

use crate::doclet::Doclet;

/// Sent once when a run starts.
#[derive(Debug, Clone, Copy)]
pub struct ParseBegin<'a> {
    pub source_files: &'a [String],
}

/// Sent for every doclet right after its name is resolved, before it is
/// indexed. Plugins may change the doclet; later passes see the changes.
#[derive(Debug)]
pub struct NewDoclet<'a> {
    pub doclet: &'a mut Doclet,
    prevented: bool,
}

impl<'a> NewDoclet<'a> {
    pub fn new(doclet: &'a mut Doclet) -> Self {
        NewDoclet {
            doclet,
            prevented: false,
        }
    }

    /// Drops the doclet from the run.
    pub fn prevent_default(&mut self) {
        self.prevented = true;
    }

    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

/// Lifecycle callbacks. Every method defaults to doing nothing.
pub trait Plugin {
    fn name(&self) -> &str;

    fn parse_begin(&mut self, _event: &ParseBegin<'_>) {}

    fn new_doclet(&mut self, _event: &mut NewDoclet<'_>) {}

    /// Called once with the final doclets, after borrows and inheritance.
    fn parse_complete(&mut self, _doclets: &[Doclet]) {}
}
