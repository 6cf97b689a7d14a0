//! Typing presence tracker.
//!
//! Tracks which peers are believed to be typing in the joined room. Peers are
//! added as typing notices arrive and removed when a decay timer fires. This
//! is an accumulate-then-decay pattern, not a multi-state machine.
//!
//! # Decay policies
//!
//! - [`DecayPolicy::Shared`]: one timer for the whole set. Every notice, even
//!   from a peer already in the set, cancels the pending timer and schedules
//!   a fresh window. When it fires, everyone is cleared together.
//! - [`DecayPolicy::PerAuthor`]: each peer has its own timer and decays
//!   independently.
//!
//! Timers are plain deadlines checked by [`Presence::tick`]. The caller drives
//! time forward; [`Presence::next_deadline`] says when the next tick matters.
//!
//! # Invariants
//!
//! - No author appears twice in the typing set.
//! - "Someone is typing" is derived from the set and cannot disagree with it.
//! - Under the shared policy a timer is pending iff the set is non-empty.

use std::{ops::Add, time::Duration};

use huddle_proto::{OutboundEvent, PeerTyping, TypingNotice};

/// Decay window used when none is configured.
pub const DEFAULT_DECAY_WINDOW: Duration = Duration::from_secs(5);

/// How typing indicators expire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecayPolicy {
    /// Single timer; the latest notice extends every indicator.
    #[default]
    Shared,
    /// One timer per author.
    PerAuthor,
}

/// Scheduled decay of typing state.
///
/// Owned by [`Presence`]. Cancelling drops the handle; rescheduling replaces
/// it with a new deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecayTimer<I> {
    deadline: I,
}

impl<I> DecayTimer<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Schedule a timer that fires `window` after `now`.
    pub fn schedule(now: I, window: Duration) -> Self {
        Self { deadline: now + window }
    }

    /// Instant at which the timer fires.
    pub fn deadline(&self) -> I {
        self.deadline
    }

    /// Whether the timer has fired by `now`.
    pub fn is_due(&self, now: I) -> bool {
        now >= self.deadline
    }
}

#[derive(Debug, Clone)]
struct TypingPeer<I> {
    author: String,
    /// Per-author timer. Always `None` under the shared policy.
    timer: Option<DecayTimer<I>>,
}

/// Typing presence for the joined room.
#[derive(Debug, Clone)]
pub struct Presence<I> {
    policy: DecayPolicy,
    window: Duration,
    /// Typing peers in the order they started typing.
    peers: Vec<TypingPeer<I>>,
    /// Shared timer. Always `None` under the per-author policy.
    timer: Option<DecayTimer<I>>,
}

impl<I> Presence<I>
where
    I: Copy + Ord + Add<Duration, Output = I>,
{
    /// Create an empty tracker.
    pub fn new(policy: DecayPolicy, window: Duration) -> Self {
        Self { policy, window, peers: Vec::new(), timer: None }
    }

    /// Decay policy in effect.
    pub fn policy(&self) -> DecayPolicy {
        self.policy
    }

    /// Decay window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Typing notice for the local user.
    ///
    /// Purely advisory to peers: the local user never appears in their own
    /// presence view, so no state changes here.
    pub fn local_typing(&self, author: &str, room_id: &str) -> OutboundEvent {
        OutboundEvent::Typing(TypingNotice {
            author: author.to_string(),
            room_id: room_id.to_string(),
        })
    }

    /// Record a peer's typing notice received at `now`.
    ///
    /// Returns `true` if the author was not already in the set.
    pub fn on_peer_typing(&mut self, typing: &PeerTyping, now: I) -> bool {
        let timer = DecayTimer::schedule(now, self.window);

        match self.policy {
            DecayPolicy::Shared => {
                if self.timer.replace(timer).is_some() {
                    tracing::trace!(author = %typing.author, "typing decay rescheduled");
                }
                self.insert(&typing.author, None)
            },
            DecayPolicy::PerAuthor => {
                if let Some(peer) = self.peers.iter_mut().find(|p| p.author == typing.author) {
                    peer.timer = Some(timer);
                    false
                } else {
                    self.insert(&typing.author, Some(timer))
                }
            },
        }
    }

    /// Fire timers due at `now`.
    ///
    /// Returns `true` if any peer was removed.
    pub fn tick(&mut self, now: I) -> bool {
        match self.policy {
            DecayPolicy::Shared => match self.timer {
                Some(timer) if timer.is_due(now) => {
                    self.timer = None;
                    let decayed = !self.peers.is_empty();
                    self.peers.clear();
                    decayed
                },
                _ => false,
            },
            DecayPolicy::PerAuthor => {
                let before = self.peers.len();
                self.peers.retain(|p| p.timer.is_some_and(|t| !t.is_due(now)));
                self.peers.len() != before
            },
        }
    }

    /// Cancel any pending timer and forget every typing peer.
    ///
    /// Called when the room is left.
    pub fn clear(&mut self) {
        self.timer = None;
        self.peers.clear();
    }

    /// Whether anyone is currently typing.
    pub fn is_someone_typing(&self) -> bool {
        !self.peers.is_empty()
    }

    /// Typing peers in the order they started typing.
    pub fn typing_peers(&self) -> impl Iterator<Item = &str> {
        self.peers.iter().map(|p| p.author.as_str())
    }

    /// Earliest pending timer deadline. `None` if nothing can decay.
    pub fn next_deadline(&self) -> Option<I> {
        match self.policy {
            DecayPolicy::Shared => self.timer.map(|t| t.deadline()),
            DecayPolicy::PerAuthor => {
                self.peers.iter().filter_map(|p| p.timer.map(|t| t.deadline())).min()
            },
        }
    }

    /// Consumer-facing summary, e.g. `alice, bob are typing...`.
    pub fn summary(&self) -> Option<String> {
        let peers: Vec<&str> = self.typing_peers().collect();
        typing_summary(peers.as_slice())
    }

    fn insert(&mut self, author: &str, timer: Option<DecayTimer<I>>) -> bool {
        if self.peers.iter().any(|p| p.author == author) {
            return false;
        }
        self.peers.push(TypingPeer { author: author.to_string(), timer });
        true
    }
}

/// Render a typing indicator line. `None` when nobody is typing.
pub fn typing_summary<S: AsRef<str>>(peers: &[S]) -> Option<String> {
    let names: Vec<&str> = peers.iter().map(AsRef::as_ref).collect();
    match names.as_slice() {
        [] => None,
        [one] => Some(format!("{one} is typing...")),
        many => Some(format!("{} are typing...", many.join(", "))),
    }
}
