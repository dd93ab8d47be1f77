use crate::command::CommandWriter;
use crate::trace::{NoopTracer, Tracer};

/// Everything a tick needs besides the definition and the instance.
///
/// One context spans a whole batch: the command writer accumulates into a
/// single page and the tracer sees every instance, told apart by
/// `instance` (the position in the batch).
pub struct ExecutionContext<'a, C, T = NoopTracer> {
    /// Caller state handed to every action and guard.
    pub user: &'a mut C,
    pub commands: CommandWriter<'a>,
    pub tracer: T,
    pub instance: u32,
}

impl<'a, C> ExecutionContext<'a, C, NoopTracer> {
    pub fn new(user: &'a mut C, commands: CommandWriter<'a>) -> Self {
        Self::with_tracer(user, commands, NoopTracer)
    }
}

impl<'a, C, T: Tracer> ExecutionContext<'a, C, T> {
    pub fn with_tracer(user: &'a mut C, commands: CommandWriter<'a>, tracer: T) -> Self {
        Self {
            user,
            commands,
            tracer,
            instance: 0,
        }
    }
}
