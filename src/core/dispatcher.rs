use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::{
    core::analyzer::{Analyzer, ContextAnalyzer},
    core::cooldown,
    core::replier::{self, Composer, ReplyComposer},
    memory::MemoryStore,
    models::{Classification, Mention, PassOutcome, PassSummary},
    providers::{MentionSource, ReplySink},
};

pub const DEFAULT_MENTION_COUNT: usize = 5;
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Missing Twitter credentials for posting replies.";

/// Runs one pass over the latest mentions: gate, fetch, classify, compose,
/// post, remember.
pub struct Dispatcher {
    mentions: Arc<dyn MentionSource>,
    sink: Arc<dyn ReplySink>,
    analyzer: Arc<dyn Analyzer>,
    composer: Arc<dyn Composer>,
    memory: MemoryStore,
}

impl Dispatcher {
    pub fn new(
        mentions: Arc<dyn MentionSource>,
        sink: Arc<dyn ReplySink>,
        analyzer: Arc<dyn Analyzer>,
        composer: Arc<dyn Composer>,
        memory: MemoryStore,
    ) -> Self {
        Dispatcher {
            mentions,
            sink,
            analyzer,
            composer,
            memory,
        }
    }

    /// One full pass. `cooldown_secs` of `None` or zero disables the gate.
    pub async fn dispatch(&self, count: usize, cooldown_secs: Option<f64>) -> PassOutcome {
        if let Some(cooldown) = cooldown_secs.filter(|c| *c > 0.0) {
            if cooldown::should_wait(&self.memory.lock_path(), cooldown) {
                info!(cooldown, "Cooldown active. Skipping dispatch.");
                return PassOutcome::CooldownActive;
            }
        }

        let mut processed = self.memory.load_processed_tweets();
        debug!(
            path = %self.memory.path().display(),
            cached = processed.len(),
            "loaded processed mention ids"
        );

        let mentions = match self.mentions.fetch_mentions(count).await {
            Ok(mentions) => mentions,
            Err(e) => {
                error!(error = %e, "failed to fetch mentions");
                Vec::new()
            }
        };
        if mentions.is_empty() {
            info!("No mentions to process");
            return PassOutcome::NoMentions;
        }

        let missing = self.sink.missing_credentials();
        if !missing.is_empty() {
            error!(missing = ?missing, "{}", MISSING_CREDENTIALS_MESSAGE);
            return PassOutcome::MissingCredentials(missing);
        }

        info!("Found {} mentions", mentions.len());
        let summary = self.process_mentions(&mentions, &mut processed).await;
        info!(
            replied = summary.replied,
            skipped = summary.skipped,
            failed = summary.failed,
            "Dispatch pass finished"
        );
        PassOutcome::Completed(summary)
    }

    async fn process_mentions(
        &self,
        mentions: &[Mention],
        processed: &mut HashSet<String>,
    ) -> PassSummary {
        let mut summary = PassSummary::default();

        for mention in mentions {
            if processed.contains(&mention.id) {
                debug!(mention_id = %mention.id, "already replied, skipping");
                summary.skipped += 1;
                continue;
            }

            match self.reply_to(mention).await {
                Ok(()) => {
                    processed.insert(mention.id.clone());
                    self.memory.save_processed_tweet(&mention.id);
                    summary.replied += 1;
                }
                Err(e) => {
                    error!(mention_id = %mention.id, "Error replying to {}: {:#}", mention.id, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    async fn reply_to(&self, mention: &Mention) -> Result<(), anyhow::Error> {
        let classification = match self.analyzer.analyze(&mention.text).await {
            Ok(classification) => classification,
            Err(e) => Classification::fallback_for(&e, &mention.text),
        };
        debug!(mention_id = %mention.id, ?classification, "mention classified");

        let reply = match self
            .composer
            .compose_reply(&classification, &mention.text)
            .await
        {
            Ok(reply) => reply,
            Err(e) => replier::fallback_reply(&e).to_string(),
        };

        self.sink
            .post_reply(&reply, &mention.id)
            .await
            .with_context(|| format!("failed to post reply to {}", mention.id))?;

        info!(mention_id = %mention.id, "Successfully replied to mention");
        Ok(())
    }
}

/// Prints `<id>: <text>` for each mention and returns how many there were.
pub async fn print_mentions(source: &dyn MentionSource, count: usize) -> Result<usize, anyhow::Error> {
    let mentions = source.fetch_mentions(count).await?;
    if mentions.is_empty() {
        warn!("No mentions returned");
    }
    for mention in &mentions {
        println!("{}: {}", mention.id, mention.text);
    }
    Ok(mentions.len())
}

/// Dry run: classifies and drafts a reply for each mention, printing the
/// result instead of posting it. The processed-id cache is left alone.
pub async fn preview_replies(
    source: &dyn MentionSource,
    analyzer: &ContextAnalyzer,
    composer: &ReplyComposer,
    count: usize,
) -> Result<usize, anyhow::Error> {
    let mentions = source.fetch_mentions(count).await?;
    for mention in &mentions {
        let classification = analyzer.classify(&mention.text).await;
        let reply = composer.compose(&classification, &mention.text).await;
        println!("{}: {}", mention.id, mention.text);
        println!(
            "  [tone={} ideology={} emotion={} slur={} reply_tone={}]",
            classification.tone,
            classification.ideology,
            classification.emotion,
            classification.contains_slur,
            classification.reply_tone
        );
        println!("  -> {}", reply);
    }
    Ok(mentions.len())
}
