//! Per-operation call accounting.
//!
//! An [`Operations`] value is created once by whoever wires the service and
//! handed to it; nothing here is global.

use codenav_api::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::Span;

#[derive(Debug)]
pub struct Operation {
    name: &'static str,
    calls: AtomicU64,
    errors: AtomicU64,
}

impl Operation {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn span(&self) -> Span {
        tracing::debug_span!("codenav", operation = self.name)
    }

    pub fn start(&self) -> OperationGuard<'_> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        OperationGuard {
            operation: self,
            started: Instant::now(),
        }
    }
}

#[must_use = "call finish() with the operation result"]
pub struct OperationGuard<'a> {
    operation: &'a Operation,
    started: Instant,
}

impl OperationGuard<'_> {
    pub fn finish<T>(self, result: &Result<T>) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match result {
            Ok(_) => tracing::debug!(
                operation = self.operation.name,
                elapsed_ms,
                "operation completed"
            ),
            Err(err) => {
                self.operation.errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    operation = self.operation.name,
                    elapsed_ms,
                    error = %err,
                    "operation failed"
                );
            }
        }
    }
}

#[derive(Debug)]
pub struct Operations {
    pub definitions: Operation,
    pub references: Operation,
    pub implementations: Operation,
    pub hover: Operation,
    pub stencil: Operation,
    pub ranges: Operation,
    pub dependencies: Operation,
    pub diagnostics: Operation,
    pub visible_uploads: Operation,
}

impl Default for Operations {
    fn default() -> Self {
        Self {
            definitions: Operation::new("codenav.definitions"),
            references: Operation::new("codenav.references"),
            implementations: Operation::new("codenav.implementations"),
            hover: Operation::new("codenav.hover"),
            stencil: Operation::new("codenav.stencil"),
            ranges: Operation::new("codenav.ranges"),
            dependencies: Operation::new("codenav.dependencies"),
            diagnostics: Operation::new("codenav.diagnostics"),
            visible_uploads: Operation::new("codenav.visible_uploads"),
        }
    }
}

impl Operations {
    pub fn all(&self) -> [&Operation; 9] {
        [
            &self.definitions,
            &self.references,
            &self.implementations,
            &self.hover,
            &self.stencil,
            &self.ranges,
            &self.dependencies,
            &self.diagnostics,
            &self.visible_uploads,
        ]
    }
}
