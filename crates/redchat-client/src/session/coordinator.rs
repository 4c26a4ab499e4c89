//! Session coordinator
//!
//! Lifecycle: `Starting -> Running -> Terminating -> Terminated`.
//!
//! While running, each loop iteration checks the broadcast stream, the
//! heartbeat timer, and the input stream without blocking, and handles at
//! most one event. The source checked first rotates every iteration, so a
//! busy source cannot starve the others. When nothing is ready the loop
//! sleeps for the poll interval. The coordinator is the only writer to the
//! store and the topic.

use futures::FutureExt;
use redchat_cache::{PresenceStore, Publisher, Subscriber};
use redchat_common::{ClientConfig, PRESENCE_TTL};
use redchat_core::{BroadcastMessage, Identity, SharedStore};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::command::Command;
use super::error::SessionError;

/// Timing of a session
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Expiry applied to the presence record on claim and on every heartbeat
    pub presence_ttl: Duration,
    /// Period of the presence heartbeat
    pub heartbeat_interval: Duration,
    /// Sleep between loop iterations when no event is ready
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            presence_ttl: PRESENCE_TTL,
            heartbeat_interval: Duration::from_secs(60),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl From<&ClientConfig> for SessionConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            presence_ttl: config.presence_ttl,
            heartbeat_interval: config.heartbeat_interval,
            poll_interval: config.poll_interval,
        }
    }
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Terminating,
    Terminated,
}

/// Why the session left the running state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// `/exit` was read from the input stream
    ExitCommand,
    /// The input stream closed without an `/exit`
    InputClosed,
    /// The presence record could not be refreshed
    HeartbeatFailed,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExitCommand => write!(f, "exit command"),
            Self::InputClosed => write!(f, "input closed"),
            Self::HeartbeatFailed => write!(f, "heartbeat failed"),
        }
    }
}

/// Result of a finished session
#[derive(Debug)]
pub struct SessionOutcome<W> {
    pub reason: TerminationReason,
    /// The console the session printed to
    pub output: W,
}

/// Event sources, in their initial polling order
#[derive(Debug, Clone, Copy)]
enum Source {
    Broadcast,
    Heartbeat,
    Input,
}

const SOURCES: [Source; 3] = [Source::Broadcast, Source::Heartbeat, Source::Input];

/// One event taken from the three sources
#[derive(Debug, PartialEq, Eq)]
enum Event {
    Broadcast(String),
    HeartbeatTick,
    Input(String),
    InputClosed,
}

/// A running chat session
pub struct Session<W> {
    identity: Identity,
    store: SharedStore,
    presence: PresenceStore,
    publisher: Publisher,
    /// `None` once the subscriber has stopped
    broadcasts: Option<mpsc::Receiver<String>>,
    input: mpsc::Receiver<String>,
    heartbeat: Interval,
    poll_interval: Duration,
    /// Index into [`SOURCES`] of the source checked first
    first_source: usize,
    echo_prefix: String,
    state: SessionState,
    out: W,
}

impl<W: Write> Session<W> {
    /// Claim `identity`, join the chat, and announce it.
    ///
    /// On error nothing needs releasing: either the claim itself failed, or
    /// the online set rejected the identity and the lock is left to expire.
    pub async fn start(
        store: SharedStore,
        identity: Identity,
        config: SessionConfig,
        input: mpsc::Receiver<String>,
        mut out: W,
    ) -> Result<Self, SessionError> {
        tracing::debug!(identity = %identity, state = ?SessionState::Starting, "Session state");
        let presence = PresenceStore::new(store.clone(), config.presence_ttl);

        if !presence.claim_identity(&identity).await? {
            return Err(SessionError::IdentityTaken(identity));
        }
        if !presence.join_online_set(&identity).await? {
            tracing::warn!(identity = %identity, "Identity lock orphaned by stale online entry");
            return Err(SessionError::StaleOnlineEntry(identity));
        }

        let mut heartbeat = tokio::time::interval_at(
            Instant::now() + config.heartbeat_interval,
            config.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let broadcasts = Subscriber::default().start(&store).await;

        write_line(
            &mut out,
            &format!(
                "\nWelcome to redchat {identity}! Type /who to see who's online, /exit to exit.\n"
            ),
        );

        let publisher = Publisher::new(store.clone());
        if let Err(e) = publisher.publish(&BroadcastMessage::joined(&identity)).await {
            tracing::warn!(identity = %identity, error = %e, "Failed to announce join");
        }

        tracing::info!(identity = %identity, "Session started");

        Ok(Self {
            echo_prefix: identity.chat_prefix(),
            identity,
            store,
            presence,
            publisher,
            broadcasts: Some(broadcasts),
            input,
            heartbeat,
            poll_interval: config.poll_interval,
            first_source: 0,
            state: SessionState::Running,
            out,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Run the event loop until the session ends, then release the identity
    pub async fn run(mut self) -> SessionOutcome<W> {
        let reason = loop {
            let Some(event) = self.poll_event() else {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            };

            match event {
                Event::Broadcast(message) => self.on_broadcast(&message),
                Event::HeartbeatTick => {
                    if !self.on_heartbeat().await {
                        break TerminationReason::HeartbeatFailed;
                    }
                }
                Event::Input(line) => match Command::parse(&line) {
                    Command::Exit => break TerminationReason::ExitCommand,
                    Command::Who => self.on_who().await,
                    Command::Say(text) => self.on_say(text).await,
                },
                Event::InputClosed => break TerminationReason::InputClosed,
            }
        };

        tracing::info!(identity = %self.identity, reason = %reason, "Session ending");

        self.transition(SessionState::Terminating);
        self.shutdown().await;
        self.transition(SessionState::Terminated);

        SessionOutcome {
            reason,
            output: self.out,
        }
    }

    fn transition(&mut self, to: SessionState) {
        tracing::debug!(identity = %self.identity, from = ?self.state, to = ?to, "Session state");
        self.state = to;
    }

    /// Take at most one ready event without blocking
    fn poll_event(&mut self) -> Option<Event> {
        let first = self.first_source;
        self.first_source = (first + 1) % SOURCES.len();

        (0..SOURCES.len()).find_map(|offset| {
            let source = SOURCES[(first + offset) % SOURCES.len()];
            self.poll_source(source)
        })
    }

    fn poll_source(&mut self, source: Source) -> Option<Event> {
        match source {
            Source::Broadcast => self.poll_broadcast(),
            Source::Heartbeat => self
                .heartbeat
                .tick()
                .now_or_never()
                .map(|_| Event::HeartbeatTick),
            Source::Input => match self.input.try_recv() {
                Ok(line) => Some(Event::Input(line)),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Event::InputClosed),
            },
        }
    }

    fn poll_broadcast(&mut self) -> Option<Event> {
        let broadcasts = self.broadcasts.as_mut()?;
        match broadcasts.try_recv() {
            Ok(message) => Some(Event::Broadcast(message)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                // Indistinguishable from a quiet topic for the user
                tracing::warn!(identity = %self.identity, "Broadcast stream closed");
                self.broadcasts = None;
                None
            }
        }
    }

    fn on_broadcast(&mut self, message: &str) {
        // Own chat lines are suppressed; own join/leave announcements are not
        if message.contains(&self.echo_prefix) {
            return;
        }

        if tracing::enabled!(tracing::Level::TRACE) {
            let kind = match BroadcastMessage::parse(message) {
                Some(BroadcastMessage::Chat { .. }) => "chat",
                Some(BroadcastMessage::Joined(_)) => "joined",
                Some(BroadcastMessage::Left(_)) => "left",
                None => "foreign",
            };
            tracing::trace!(identity = %self.identity, kind, "Broadcast received");
        }

        write_line(&mut self.out, message);
    }

    /// Returns `false` when the session must end
    async fn on_heartbeat(&mut self) -> bool {
        match self.presence.heartbeat(&self.identity).await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(identity = %self.identity, "Presence record missing on heartbeat");
                write_line(&mut self.out, "Heartbeat set failed");
                false
            }
            Err(e) => {
                tracing::warn!(identity = %self.identity, error = %e, "Heartbeat failed");
                write_line(&mut self.out, "Heartbeat set failed");
                false
            }
        }
    }

    async fn on_who(&mut self) {
        match self.presence.list_online().await {
            Ok(names) => {
                for name in names {
                    write_line(&mut self.out, &name);
                }
            }
            Err(e) => tracing::warn!(identity = %self.identity, error = %e, "Failed to list online users"),
        }
    }

    async fn on_say(&mut self, text: &str) {
        let message = BroadcastMessage::chat(&self.identity, text);
        if let Err(e) = self.publisher.publish(&message).await {
            tracing::warn!(identity = %self.identity, error = %e, "Failed to publish message");
        }
    }

    /// Release the identity, announce the departure, close the store.
    /// Every step is best effort.
    async fn shutdown(&mut self) {
        self.presence.release(&self.identity).await;

        if let Err(e) = self
            .publisher
            .publish(&BroadcastMessage::left(&self.identity))
            .await
        {
            tracing::warn!(identity = %self.identity, error = %e, "Failed to announce departure");
        }

        self.store.close();
        tracing::info!(identity = %self.identity, "Session terminated");
    }
}

fn write_line<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
        tracing::warn!(error = %e, "Failed to write to console");
    }
}
