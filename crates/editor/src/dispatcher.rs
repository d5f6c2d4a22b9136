//! The command dispatcher: middleware chain, execution, bounded history.
//!
//! Dispatch order: the command passes through the middleware chain (each
//! interceptor may inspect, replace, or swallow it), then executes against
//! the current content, then lands on the history stack. A new dispatch
//! clears the redo stack (linear history, not a tree). Undo/redo pop
//! between the two stacks and are no-ops on empty stacks.
//!
//! Operation extraction is just a middleware ([`OperationCollector`]), so
//! the dispatcher stays ignorant of batching and networking.

use std::collections::VecDeque;

use slate_core::operation::Operation;

use crate::command::{CommandMetadata, EditorCommand};
use crate::content::EditorContent;

/// Default bound on the undo history; the oldest entry is evicted past it.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// An interceptor in the dispatch chain. Call `next` to pass the command
/// on; not calling it swallows the command.
pub trait CommandMiddleware: Send {
    fn handle(
        &mut self,
        command: Box<dyn EditorCommand>,
        next: &mut dyn FnMut(Box<dyn EditorCommand>),
    );
}

/// Middleware that hands each command's operations to a sink, then passes
/// the command through unchanged.
pub struct OperationCollector {
    sink: Box<dyn FnMut(Vec<Operation>) + Send>,
}

impl OperationCollector {
    pub fn new(sink: impl FnMut(Vec<Operation>) + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }
}

impl CommandMiddleware for OperationCollector {
    fn handle(
        &mut self,
        command: Box<dyn EditorCommand>,
        next: &mut dyn FnMut(Box<dyn EditorCommand>),
    ) {
        let operations = command.operations();
        if !operations.is_empty() {
            (self.sink)(operations);
        }
        next(command);
    }
}

/// Executes commands against local content state and keeps undo/redo
/// history.
pub struct CommandDispatcher {
    content: EditorContent,
    middleware: Vec<Box<dyn CommandMiddleware>>,
    history: VecDeque<Box<dyn EditorCommand>>,
    redo: Vec<Box<dyn EditorCommand>>,
    history_limit: usize,
}

impl CommandDispatcher {
    pub fn new(content: EditorContent) -> Self {
        Self {
            content,
            middleware: Vec::new(),
            history: VecDeque::new(),
            redo: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Append a middleware; interceptors run in registration order.
    pub fn with_middleware(mut self, middleware: impl CommandMiddleware + 'static) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    pub fn content(&self) -> &EditorContent {
        &self.content
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Run a command through the middleware chain, execute it, and record
    /// it in history. Returns metadata of the executed command, or `None`
    /// if a middleware swallowed it.
    pub fn dispatch(&mut self, command: Box<dyn EditorCommand>) -> Option<CommandMetadata> {
        // Take the chain out so the terminal closure can borrow the rest
        // of the dispatcher.
        let mut middleware = std::mem::take(&mut self.middleware);

        let mut executed = None;
        {
            let content = &mut self.content;
            let history = &mut self.history;
            let redo = &mut self.redo;
            let history_limit = self.history_limit;
            let executed = &mut executed;

            let mut terminal = |mut command: Box<dyn EditorCommand>| {
                let meta = command.metadata();
                tracing::debug!(command = meta.kind, id = %meta.id, "Executing command");
                *content = command.execute(content);
                history.push_back(command);
                if history.len() > history_limit {
                    history.pop_front();
                }
                redo.clear();
                *executed = Some(meta);
            };
            run_chain(&mut middleware, command, &mut terminal);
        }

        self.middleware = middleware;
        executed
    }

    /// Undo the most recent command. No-op when history is empty.
    pub fn undo(&mut self) -> Option<CommandMetadata> {
        let command = self.history.pop_back()?;
        let meta = command.metadata();
        self.content = command.undo(&self.content);
        self.redo.push(command);
        Some(meta)
    }

    /// Re-apply the most recently undone command. No-op when the redo
    /// stack is empty.
    pub fn redo(&mut self) -> Option<CommandMetadata> {
        let mut command = self.redo.pop()?;
        let meta = command.metadata();
        self.content = command.execute(&self.content);
        self.history.push_back(command);
        Some(meta)
    }
}

fn run_chain(
    middleware: &mut [Box<dyn CommandMiddleware>],
    command: Box<dyn EditorCommand>,
    terminal: &mut dyn FnMut(Box<dyn EditorCommand>),
) {
    match middleware.split_first_mut() {
        None => terminal(command),
        Some((head, rest)) => {
            head.handle(command, &mut |cmd| run_chain(rest, cmd, terminal));
        }
    }
}
