//! Cause Chain Walk

use std::collections::HashSet;

use crate::config::TraceOptions;
use crate::traceable::Traceable;

/// Why a cause chain stopped early
#[derive(Clone, Copy)]
pub enum Cut<'a> {
    /// The next cause was already visited
    Circular(&'a dyn Traceable),
    /// More than `max_causes` causes
    Depth(usize),
}

/// The causes reachable from a root error, in order
pub struct CauseChain<'a> {
    causes: Vec<&'a dyn Traceable>,
    cut: Option<Cut<'a>>,
}

impl<'a> CauseChain<'a> {
    /// Causes to render, nearest first. Excludes the root.
    pub fn causes(&self) -> &[&'a dyn Traceable] {
        &self.causes
    }

    /// Why the walk stopped, if it did not reach the end of the chain
    pub fn cut(&self) -> Option<Cut<'a>> {
        self.cut
    }
}

/// Walk the cause chain of `root` iteratively.
///
/// Stops at the first cause already seen or once `max_causes` causes have
/// been collected. Returns an empty chain when causes are disabled.
///
/// An error is identified by its address and size, so a cause stored inline
/// at the start of its parent is not mistaken for the parent.
pub fn walk<'a, E>(root: &'a E, options: &TraceOptions) -> CauseChain<'a>
where
    E: Traceable + ?Sized,
{
    let mut chain = CauseChain {
        causes: Vec::new(),
        cut: None,
    };
    if !options.include_causes {
        return chain;
    }

    let mut visited: HashSet<Identity> = HashSet::new();
    visited.insert((root as *const E as *const (), std::mem::size_of_val(root)));

    let mut next = root.cause();
    while let Some(cause) = next {
        if !visited.insert(identity(cause)) {
            chain.cut = Some(Cut::Circular(cause));
            break;
        }
        if chain.causes.len() == options.max_causes {
            chain.cut = Some(Cut::Depth(options.max_causes));
            break;
        }
        chain.causes.push(cause);
        next = cause.cause();
    }

    if chain.cut.is_some() {
        tracing::debug!(
            causes = chain.causes.len(),
            circular = matches!(chain.cut, Some(Cut::Circular(_))),
            "Cause chain truncated"
        );
    }
    chain
}

type Identity = (*const (), usize);

fn identity(err: &dyn Traceable) -> Identity {
    (
        err as *const dyn Traceable as *const (),
        std::mem::size_of_val(err),
    )
}
