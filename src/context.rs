use crate::arena::NodeId;
use crate::tree::Tree;
use crate::{parse, Error, ParseOptions, Reinit, Result};

/// Owner of the one tree a process loads at startup.
///
/// `init` parses a document and keeps the tree; after that the tree is read
/// only. A failed `init` leaves the context empty. Whether a second `init`
/// is refused or replaces the tree is decided by [`ParseOptions::reinit`].
#[derive(Debug, Default)]
pub struct Context {
    options: ParseOptions,
    tree: Option<Tree>,
}

impl Context {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            tree: None,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn init(&mut self, text: impl Into<String>) -> Result<&Tree> {
        self.prepare()?;
        let tree = parse::from_string(text.into(), &self.options)?;
        Ok(self.tree.insert(tree))
    }

    pub fn init_bytes(&mut self, bytes: &[u8]) -> Result<&Tree> {
        self.prepare()?;
        let tree = parse::from_slice(bytes, &self.options)?;
        Ok(self.tree.insert(tree))
    }

    fn prepare(&mut self) -> Result<()> {
        if self.tree.is_some() {
            match self.options.reinit {
                Reinit::Reject => return Err(Error::Busy),
                Reinit::Replace => {
                    tracing::debug!("replacing loaded skc tree");
                    self.tree = None;
                }
            }
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Result<&Tree> {
        self.tree.as_ref().ok_or(Error::NotInitialized)
    }

    /// Drops the loaded tree so that `init` can run again.
    pub fn reset(&mut self) -> Option<Tree> {
        self.tree.take()
    }

    /// [`Tree::find_value`] from the top level; `None` before `init`.
    pub fn find_value(&self, key: &str) -> Option<(&str, Option<NodeId>)> {
        self.tree.as_ref()?.find_value(None, key)
    }
}
