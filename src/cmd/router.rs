//! Function-code keyed command dispatch.
//!
//! Each entry records the exact payload length its [`CommandPayload`]
//! type declares.  The router validates length before a handler runs,
//! so handlers only ever see a decoded, well-formed payload.
//!
//! Every dispatch bumps exactly one of the two counters.  Counters wrap.

use log::{debug, warn};

use crate::app::commands::CommandPayload;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::{Error, Result};

/// Size of the dispatch table.
pub const MAX_FUNC_CODES: usize = 32;

type Handler<C, S> = Box<dyn Fn(&mut C, &mut S, &[u8]) -> bool>;

struct CommandEntry<C, S> {
    expected_len: usize,
    handler: Handler<C, S>,
}

pub struct CommandRouter<C, S> {
    table: [Option<CommandEntry<C, S>>; MAX_FUNC_CODES],
    valid_cnt: u16,
    invalid_cnt: u16,
}

impl<C, S> Default for CommandRouter<C, S>
where
    S: EventSink,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S> CommandRouter<C, S>
where
    S: EventSink,
{
    pub fn new() -> Self {
        Self {
            table: core::array::from_fn(|_| None),
            valid_cnt: 0,
            invalid_cnt: 0,
        }
    }

    /// Register `handler` for `fc`, taking payloads of type `P`.
    pub fn register<P, F>(&mut self, fc: u8, handler: F) -> Result<()>
    where
        C: 'static,
        S: 'static,
        P: CommandPayload + 'static,
        F: Fn(&mut C, &mut S, P) -> bool + 'static,
    {
        let slot = self
            .table
            .get_mut(usize::from(fc))
            .ok_or(Error::FunctionCodeOutOfRange(fc))?;
        if slot.is_some() {
            return Err(Error::FunctionCodeInUse(fc));
        }
        *slot = Some(CommandEntry {
            expected_len: P::LEN,
            handler: Box::new(move |ctx, sink, bytes| handler(ctx, sink, P::decode(bytes))),
        });
        Ok(())
    }

    /// Validate and run the handler for `fc`.  Returns the handler's
    /// verdict, or `false` if the command never reached it.
    pub fn dispatch(&mut self, ctx: &mut C, sink: &mut S, fc: u8, payload: &[u8]) -> bool {
        let verdict = match self.table.get(usize::from(fc)).and_then(Option::as_ref) {
            None => Err(Error::UnknownFunctionCode(fc)),
            Some(entry) if entry.expected_len != payload.len() => Err(Error::MalformedPayload {
                fc,
                expected: entry.expected_len,
                actual: payload.len(),
            }),
            Some(entry) => Ok((entry.handler)(ctx, sink, payload)),
        };

        match verdict {
            Ok(true) => {
                self.valid_cnt = self.valid_cnt.wrapping_add(1);
                debug!("Command fc={} accepted", fc);
                true
            }
            Ok(false) => {
                self.count_invalid();
                false
            }
            Err(e) => {
                warn!("Command rejected: {}", e);
                sink.emit(&AppEvent::CommandRejected(e));
                self.count_invalid();
                false
            }
        }
    }

    /// Count a command rejected before it reached the router.
    pub fn count_invalid(&mut self) {
        self.invalid_cnt = self.invalid_cnt.wrapping_add(1);
    }

    pub fn valid_count(&self) -> u16 {
        self.valid_cnt
    }

    pub fn invalid_count(&self) -> u16 {
        self.invalid_cnt
    }

    pub fn reset_status(&mut self) {
        self.valid_cnt = 0;
        self.invalid_cnt = 0;
    }
}
