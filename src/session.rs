use crate::agent::{AgentId, AgentRegistry};
use crate::error::{CoreError, CoreResult};

pub const DEFAULT_HISTORY_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub seq: u64,
}

/// Identifies the session a dispatch was issued for. A ticket stops being current
/// as soon as the session is closed or another agent is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTicket {
    generation: u64,
    agent: AgentId,
}

impl SessionTicket {
    pub fn agent(&self) -> AgentId {
        self.agent
    }
}

/// The single open conversation. Only user and assistant turns are stored here;
/// the system instruction is added to outbound requests from the agent profile.
#[derive(Debug, Default)]
pub struct ConversationSession {
    active: Option<AgentId>,
    messages: Vec<Message>,
    generation: u64,
    next_seq: u64,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `selector` and discards any prior conversation. An unknown selector
    /// leaves the current session untouched.
    pub fn open(&mut self, registry: &AgentRegistry, selector: &str) -> CoreResult<AgentId> {
        let id = registry.lookup(selector)?.id;
        self.reset(Some(id));
        Ok(id)
    }

    pub fn close(&mut self) {
        if self.active.is_none() {
            return;
        }
        self.reset(None);
    }

    fn reset(&mut self, active: Option<AgentId>) {
        self.active = active;
        self.messages.clear();
        self.generation += 1;
    }

    pub fn active_agent(&self) -> Option<AgentId> {
        self.active
    }

    pub fn ticket(&self) -> CoreResult<SessionTicket> {
        let agent = self.active.ok_or_else(CoreError::no_open_agent)?;
        Ok(SessionTicket {
            generation: self.generation,
            agent,
        })
    }

    pub fn is_current(&self, ticket: &SessionTicket) -> bool {
        self.active == Some(ticket.agent) && self.generation == ticket.generation
    }

    /// Appends a user turn. Blank input is ignored and reported as `Ok(false)`.
    pub fn append_user(&mut self, text: &str) -> CoreResult<bool> {
        if self.active.is_none() {
            return Err(CoreError::no_open_agent());
        }

        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }

        self.push(Role::User, text);
        Ok(true)
    }

    pub fn append_assistant(&mut self, text: &str) -> CoreResult<()> {
        if self.active.is_none() {
            return Err(CoreError::no_open_agent());
        }

        self.push(Role::Assistant, text);
        Ok(())
    }

    fn push(&mut self, role: Role, text: &str) {
        self.messages.push(Message {
            role,
            text: text.to_string(),
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages in conversation order.
    pub fn history_window(&self, n: usize) -> impl DoubleEndedIterator<Item = &Message> + Clone {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].iter()
    }
}
