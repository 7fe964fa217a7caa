// src/controller/sync_controller/transaction.rs

use core::fmt::Debug;
use std::time::Duration;

use log::debug;

use super::SyncController;
use crate::common::{
    command::{CommandFormatError, CommandFrame, ControllerCommand},
    error::ControllerError,
    frame,
    hal_traits::ControllerSerial,
};
use crate::controller::listener::{exactly, starts_with, LineListener, Waiter};

/// How a command or query ended.
///
/// A nak and a silent controller are different answers; callers branch on
/// them instead of catching errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Acknowledged command (`None`) or answered query (`Some(line)`).
    Success(Option<String>),
    /// The controller answered with a nak.
    ExplicitFailure(String),
    /// The echo, the acknowledgement or the answer did not arrive in time.
    Timeout(String),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }

    /// The answer line of a successful query.
    pub fn payload(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success(Some(line)) => Some(line),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success(_) => None,
            RequestOutcome::ExplicitFailure(reason) | RequestOutcome::Timeout(reason) => Some(reason),
        }
    }

    /// Folds a failed outcome into an error naming `subject`.
    pub(super) fn into_result<E: Debug>(self, subject: &str) -> Result<Option<String>, ControllerError<E>> {
        match self {
            RequestOutcome::Success(payload) => Ok(payload),
            RequestOutcome::ExplicitFailure(reason) => {
                Err(ControllerError::Rejected(format!("{}: {}", subject, reason)))
            }
            RequestOutcome::Timeout(reason) => {
                Err(ControllerError::NoResponse(format!("{}: {}", subject, reason)))
            }
        }
    }
}

/// One request between arming and resolution. Never reused.
struct PendingRequest {
    frame: CommandFrame,
    echo: Waiter,
    response: Option<Waiter>,
}

impl PendingRequest {
    /// Formats `command` and registers the waiter for its echo.
    fn arm(listener: &LineListener, command: &ControllerCommand<'_>) -> Result<Self, CommandFormatError> {
        let frame = command.format_into()?;
        let echo = listener.register(exactly(frame.as_str()));
        Ok(Self { frame, echo, response: None })
    }

    /// Registers the waiter for the answer line.
    fn expect_response<P>(mut self, listener: &LineListener, predicate: P) -> Self
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.response = Some(listener.register(predicate));
        self
    }

    fn text(&self) -> &str {
        self.frame.as_str()
    }

    fn await_echo(&self, timeout: Duration) -> bool {
        let echoed = self.echo.wait(timeout).is_some();
        debug!("{:?} echo {}", self.text(), if echoed { "seen" } else { "missing" });
        echoed
    }

    fn no_echo(&self) -> RequestOutcome {
        RequestOutcome::Timeout(format!("no command echo for {}", self.text()))
    }

    fn await_response(&self, timeout: Duration) -> RequestOutcome {
        let Some(response) = &self.response else {
            return RequestOutcome::Success(None);
        };
        match response.wait(timeout) {
            Some(line) => RequestOutcome::Success(Some(line)),
            None => RequestOutcome::Timeout(format!("no query response for {}", self.text())),
        }
    }
}

/// Resolves a command by whichever of `+` and `-` reached `verdict` first.
fn resolve_acknowledgement(verdict: &Waiter, timeout: Duration, text: &str) -> RequestOutcome {
    match verdict.wait(timeout).as_deref() {
        Some(frame::ACK) => {
            debug!("{:?} acknowledged", text);
            RequestOutcome::Success(None)
        }
        Some(_) => {
            debug!("{:?} rejected", text);
            RequestOutcome::ExplicitFailure(format!("negative acknowledgement for {}", text))
        }
        None => RequestOutcome::Timeout(format!("no acknowledgement for {}", text)),
    }
}

impl<IF> SyncController<IF>
where
    IF: ControllerSerial,
{
    /// Writes `command` and resolves it to ack, nak or timeout.
    pub fn issue_command(&mut self, command: &str) -> Result<RequestOutcome, ControllerError<IF::Error>> {
        self.send_command(&ControllerCommand::Raw(command))
    }

    /// Writes `query` and waits for the first line accepted by `predicate`
    /// after the echo.
    pub fn issue_query<P>(
        &mut self,
        query: &str,
        predicate: P,
    ) -> Result<RequestOutcome, ControllerError<IF::Error>>
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.send_query(&ControllerCommand::Raw(query), predicate)
    }

    /// Like [`issue_query`](Self::issue_query), accepting the line that
    /// starts with the query's key (`?A 1` is answered by `A=...`).
    ///
    /// Text that is not a read request has no answer line and resolves like
    /// [`issue_command`](Self::issue_command).
    pub fn issue_keyed_query(&mut self, query: &str) -> Result<RequestOutcome, ControllerError<IF::Error>> {
        self.send_keyed_query(&ControllerCommand::Raw(query))
    }

    pub(super) fn send_command(
        &mut self,
        command: &ControllerCommand<'_>,
    ) -> Result<RequestOutcome, ControllerError<IF::Error>> {
        let Some(link) = self.link.as_ref() else {
            return Err(ControllerError::NotConnected);
        };
        let request = PendingRequest::arm(&link.listener, command)?;

        // A late ack or nak of an earlier command must not resolve this one.
        let stale = link.verdict.clear();
        if stale > 0 {
            debug!("dropped {} stale acknowledgements", stale);
        }

        Self::write_frame(
            &mut self.interface,
            request.frame.as_bytes(),
            true,
            &request.echo,
            self.config.write_timeout,
        )?;

        if !request.await_echo(self.config.command_timeout) {
            return Ok(request.no_echo());
        }
        Ok(resolve_acknowledgement(&link.verdict, self.config.command_timeout, request.text()))
    }

    /// Sends a read request and takes the line keyed like it.
    pub(super) fn send_keyed_query(
        &mut self,
        command: &ControllerCommand<'_>,
    ) -> Result<RequestOutcome, ControllerError<IF::Error>> {
        let Some(key) = command.response_key() else {
            return self.send_command(command);
        };
        let prefix = format!("{}{}", key, frame::KEY_DELIMITER);
        self.send_query(command, starts_with(prefix))
    }

    pub(super) fn send_query<P>(
        &mut self,
        command: &ControllerCommand<'_>,
        predicate: P,
    ) -> Result<RequestOutcome, ControllerError<IF::Error>>
    where
        P: Fn(&str) -> bool + Send + Sync + 'static,
    {
        let Some(link) = self.link.as_ref() else {
            return Err(ControllerError::NotConnected);
        };
        let request = PendingRequest::arm(&link.listener, command)?
            .expect_response(&link.listener, predicate);

        Self::write_frame(
            &mut self.interface,
            request.frame.as_bytes(),
            true,
            &request.echo,
            self.config.write_timeout,
        )?;

        if !request.await_echo(self.config.command_timeout) {
            return Ok(request.no_echo());
        }
        Ok(request.await_response(self.config.command_timeout))
    }
}
