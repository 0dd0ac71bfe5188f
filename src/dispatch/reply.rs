use std::sync::atomic::{AtomicBool, Ordering};

use serenity::all::{
    CommandInteraction, Context, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, CreateMessage,
    EditInteractionResponse, EditMessage, Message,
};
use tokio::sync::Mutex;

/// Path-agnostic reply payload. Each sink converts it into the builder its
/// transport needs; `ephemeral` is honored on the interaction path and
/// ignored on the message path.
#[derive(Clone, Debug, Default)]
pub struct BotReply {
    content: Option<String>,
    embeds: Vec<CreateEmbed>,
    ephemeral: bool,
}

impl BotReply {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn embed(mut self, embed: CreateEmbed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    fn into_response(self) -> CreateInteractionResponseMessage {
        let mut message = CreateInteractionResponseMessage::new()
            .embeds(self.embeds)
            .ephemeral(self.ephemeral);
        if let Some(content) = self.content {
            message = message.content(content);
        }
        message
    }

    fn into_followup(self) -> CreateInteractionResponseFollowup {
        let mut followup = CreateInteractionResponseFollowup::new()
            .embeds(self.embeds)
            .ephemeral(self.ephemeral);
        if let Some(content) = self.content {
            followup = followup.content(content);
        }
        followup
    }

    fn into_edit_response(self) -> EditInteractionResponse {
        let mut edit = EditInteractionResponse::new().embeds(self.embeds);
        if let Some(content) = self.content {
            edit = edit.content(content);
        }
        edit
    }

    fn into_message(self) -> CreateMessage {
        let mut message = CreateMessage::new().embeds(self.embeds);
        if let Some(content) = self.content {
            message = message.content(content);
        }
        message
    }

    fn into_edit_message(self) -> EditMessage {
        let mut edit = EditMessage::new().embeds(self.embeds);
        if let Some(content) = self.content {
            edit = edit.content(content);
        }
        edit
    }
}

/// Reply capability handed to command handlers, identical in shape for both
/// ingestion paths. The message variant emulates `edit_reply` by editing
/// its own previous reply, or sending a fresh message when none exists yet.
pub enum ReplySink {
    Interaction {
        interaction: CommandInteraction,
        acked: AtomicBool,
    },
    Message {
        origin: Message,
        last_reply: Mutex<Option<Message>>,
    },
}

impl ReplySink {
    pub fn for_interaction(interaction: CommandInteraction) -> Self {
        ReplySink::Interaction {
            interaction,
            acked: AtomicBool::new(false),
        }
    }

    pub fn for_message(origin: Message) -> Self {
        ReplySink::Message {
            origin,
            last_reply: Mutex::new(None),
        }
    }

    /// Whether a primary reply has already been delivered. Decides between
    /// `reply` and `follow_up` when reporting a handler failure.
    pub async fn has_replied(&self) -> bool {
        match self {
            ReplySink::Interaction { acked, .. } => acked.load(Ordering::Acquire),
            ReplySink::Message { last_reply, .. } => last_reply.lock().await.is_some(),
        }
    }

    pub async fn reply(&self, ctx: &Context, reply: BotReply) -> serenity::Result<()> {
        match self {
            ReplySink::Interaction { interaction, acked } => {
                if acked.load(Ordering::Acquire) {
                    interaction
                        .create_followup(&ctx.http, reply.into_followup())
                        .await?;
                } else {
                    interaction
                        .create_response(
                            &ctx.http,
                            CreateInteractionResponse::Message(reply.into_response()),
                        )
                        .await?;
                    acked.store(true, Ordering::Release);
                }
                Ok(())
            }
            ReplySink::Message { origin, last_reply } => {
                let message = origin
                    .channel_id
                    .send_message(ctx, reply.into_message().reference_message(origin))
                    .await?;
                *last_reply.lock().await = Some(message);
                Ok(())
            }
        }
    }

    pub async fn edit_reply(&self, ctx: &Context, reply: BotReply) -> serenity::Result<()> {
        match self {
            ReplySink::Interaction { interaction, .. } => {
                interaction
                    .edit_response(&ctx.http, reply.into_edit_response())
                    .await?;
                Ok(())
            }
            ReplySink::Message { origin, last_reply } => {
                let mut guard = last_reply.lock().await;
                match guard.as_mut() {
                    Some(message) => message.edit(ctx, reply.into_edit_message()).await,
                    None => {
                        let message = origin
                            .channel_id
                            .send_message(ctx, reply.into_message())
                            .await?;
                        *guard = Some(message);
                        Ok(())
                    }
                }
            }
        }
    }

    pub async fn follow_up(&self, ctx: &Context, reply: BotReply) -> serenity::Result<()> {
        match self {
            ReplySink::Interaction { interaction, .. } => {
                interaction
                    .create_followup(&ctx.http, reply.into_followup())
                    .await?;
                Ok(())
            }
            ReplySink::Message { origin, .. } => {
                origin
                    .channel_id
                    .send_message(ctx, reply.into_message().reference_message(origin))
                    .await?;
                Ok(())
            }
        }
    }
}
