//! One-shot and interactive chat.

use std::io::Write;

use futures::StreamExt;
use genlab::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Context;
use crate::ChatArgs;
use crate::config::SamplingSection;
use crate::error::Result;

/// A conversation whose history is resent with every turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    model: String,
    system: Option<String>,
    sampling: SamplingSection,
    history: Vec<Message>,
}

impl Conversation {
    /// Start an empty conversation. An empty model uses the provider default.
    #[must_use]
    pub fn new(model: impl Into<String>, system: Option<String>, sampling: SamplingSection) -> Self {
        Self {
            model: model.into(),
            system,
            sampling,
            history: Vec::new(),
        }
    }

    /// Turns exchanged so far, oldest first. The system prompt is not included.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(self.model.clone());
        if let Some(system) = &self.system {
            request = request.system(system.clone());
        }
        for message in &self.history {
            request = request.message(message.clone());
        }
        request.max_tokens = self.sampling.max_tokens;
        request.temperature = self.sampling.temperature;
        request
    }

    /// Send a user turn, write the reply to `out`, and record both turns.
    ///
    /// On failure the user turn is dropped so the history stays paired.
    pub async fn send<P, W>(
        &mut self,
        provider: &P,
        text: &str,
        stream: bool,
        out: &mut W,
    ) -> Result<String>
    where
        P: ChatProvider + ?Sized,
        W: Write,
    {
        self.history.push(Message::user(text));

        match self.reply(provider, stream, out).await {
            Ok(reply) => {
                self.history.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                self.history.pop();
                Err(e)
            }
        }
    }

    async fn reply<P, W>(&self, provider: &P, stream: bool, out: &mut W) -> Result<String>
    where
        P: ChatProvider + ?Sized,
        W: Write,
    {
        let request = self.request();

        if stream && provider.supports_streaming() {
            let mut chunks = provider.chat_stream(&request).await?;
            let mut aggregator = StreamAggregator::new();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                if let Some(text) = chunk.as_text() {
                    write!(out, "{text}")?;
                    out.flush()?;
                }
                aggregator.apply(&chunk);
            }
            writeln!(out)?;
            if aggregator.stop_reason().is_some_and(|r| r.is_truncated()) {
                tracing::warn!("reply stopped at the token limit");
            }
            return Ok(aggregator.text().to_owned());
        }

        let response = provider.chat(&request).await?;
        if response.is_truncated() {
            tracing::warn!("reply stopped at the token limit");
        }
        let reply = response.text().unwrap_or_default();
        writeln!(out, "{reply}")?;
        Ok(reply)
    }
}

/// Run the chat command.
pub async fn cmd_chat(ctx: &Context, args: ChatArgs) -> Result<()> {
    let client = ctx.client()?;
    let mut conversation = Conversation::new(
        args.model.unwrap_or_default(),
        args.system,
        ctx.sampling(args.sampling),
    );
    let mut stdout = std::io::stdout();

    if let Some(message) = args.message {
        conversation
            .send(&client, &message, args.stream, &mut stdout)
            .await?;
        return Ok(());
    }

    println!(
        "genlab chat | model: {} | type 'exit' to quit\n",
        if conversation.model.is_empty() {
            client.default_model()
        } else {
            conversation.model.as_str()
        }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        print!("Assistant: ");
        stdout.flush()?;
        if let Err(e) = conversation
            .send(&client, line, args.stream, &mut stdout)
            .await
        {
            println!();
            tracing::error!("{e}");
        }
    }

    tracing::debug!(turns = conversation.history().len(), "chat session ended");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use genlab::message::Role;

    fn conversation() -> Conversation {
        Conversation::new(
            "",
            Some("You are a helpful assistant.".to_owned()),
            SamplingSection::default(),
        )
    }

    #[tokio::test]
    async fn history_grows_in_order() {
        let provider = MockProvider::new(vec!["Hi!".to_owned(), "Arlington.".to_owned()]);
        let mut chat = conversation();
        let mut out = Vec::new();

        chat.send(&provider, "Hello", false, &mut out).await.unwrap();
        chat.send(&provider, "Where?", false, &mut out)
            .await
            .unwrap();

        let roles: Vec<Role> = chat.history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(String::from_utf8(out).unwrap(), "Hi!\nArlington.\n");

        let request = chat.request();
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages.len(), 5);
    }

    #[tokio::test]
    async fn streamed_reply_is_written_and_recorded() {
        let provider = MockProvider::new(vec!["one two three".to_owned()]);
        let mut chat = conversation();
        let mut out = Vec::new();

        let reply = chat.send(&provider, "count", true, &mut out).await.unwrap();

        assert_eq!(reply, "one two three");
        assert_eq!(String::from_utf8(out).unwrap(), "one two three\n");
        assert_eq!(chat.history()[1].text().as_deref(), Some("one two three"));
    }

    #[tokio::test]
    async fn failed_turn_is_not_kept() {
        let provider = MockProvider::new(Vec::new());
        let mut chat = conversation();
        let mut out = Vec::new();

        assert!(chat.send(&provider, "hello", false, &mut out).await.is_err());
        assert!(chat.history().is_empty());
    }

    #[test]
    fn sampling_applies_to_requests() {
        let chat = Conversation::new(
            "gpt-4o",
            None,
            SamplingSection {
                max_tokens: Some(50),
                temperature: Some(0.3),
            },
        );
        let request = chat.request();
        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.max_tokens, Some(50));
        assert_eq!(request.temperature, Some(0.3));
        assert!(request.messages.is_empty());
    }
}
