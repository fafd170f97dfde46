//! Payload consumer abstraction

/// What the consumer did with an offered payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// Done with the payload; framing may resume
    Done,
    /// Keep the payload; it is offered again on the next poll
    Later,
}

/// Receiver for verified payloads
///
/// The slice is only valid for the duration of the call. Returning
/// [`Handled::Done`] acknowledges the payload and releases the decoder buffer.
pub trait PayloadConsumer {
    /// Handle a verified payload
    ///
    /// Returning [`Handled::Later`] keeps the payload in the decoder and
    /// blocks framing until a later poll returns [`Handled::Done`].
    fn on_payload(&mut self, payload: &[u8]) -> Handled;
}

impl<F> PayloadConsumer for F
where
    F: FnMut(&[u8]) -> Handled,
{
    fn on_payload(&mut self, payload: &[u8]) -> Handled {
        self(payload)
    }
}
