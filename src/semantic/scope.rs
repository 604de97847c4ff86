//! Scope chain for template validation.
//!
//! Scopes live in an append-only arena and refer to their parent by index.
//! A scope is never modified after it is pushed, so sibling subtrees can
//! share the scope of their common ancestor without interfering.

use crate::semantic::schema::TypeDescriptor;

/// Handle to a scope in a [`ScopeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn as_usize(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct ScopeFrame {
    type_descriptor: TypeDescriptor,
    parent: Option<ScopeId>,
    depth: usize,
}

/// Ascent asked for more enclosing scopes than exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeUnderflow {
    pub requested: usize,
    pub available: usize,
}

/// Arena of validation scopes, rooted at the feature type.
#[derive(Debug, Clone)]
pub struct ScopeArena {
    frames: Vec<ScopeFrame>,
}

impl ScopeArena {
    /// Creates an arena holding only the root scope.
    pub fn new(root_type: TypeDescriptor) -> Self {
        Self {
            frames: vec![ScopeFrame {
                type_descriptor: root_type,
                parent: None,
                depth: 0,
            }],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Pushes a child scope of `parent`. O(1).
    pub fn push(&mut self, type_descriptor: TypeDescriptor, parent: ScopeId) -> ScopeId {
        let depth = self.frame(parent).depth + 1;
        let id = ScopeId(self.frames.len());
        self.frames.push(ScopeFrame {
            type_descriptor,
            parent: Some(parent),
            depth,
        });
        id
    }

    /// Follows `levels` parent links from `scope`.
    pub fn ascend(&self, scope: ScopeId, levels: usize) -> Result<ScopeId, ScopeUnderflow> {
        let available = self.depth(scope);
        if levels > available {
            return Err(ScopeUnderflow {
                requested: levels,
                available,
            });
        }
        let mut current = scope;
        for _ in 0..levels {
            // depth > 0 guarantees a parent
            current = self.frame(current).parent.unwrap_or(current);
        }
        Ok(current)
    }

    pub fn current_type(&self, scope: ScopeId) -> &TypeDescriptor {
        &self.frame(scope).type_descriptor
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.frame(scope).parent
    }

    /// Number of enclosing scopes above `scope`; zero for the root.
    pub fn depth(&self, scope: ScopeId) -> usize {
        self.frame(scope).depth
    }

    /// Number of scopes ever pushed, the root included.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn frame(&self, scope: ScopeId) -> &ScopeFrame {
        &self.frames[scope.0]
    }
}
