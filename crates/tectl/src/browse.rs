use std::time::Duration;

use anyhow::Context;
use models::Entity;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::list::parse_entity;
use crate::rows::{Rows, Sources};

#[derive(Debug, clap::Args)]
pub struct Browse {
    /// Kind of entity held by `--input`.
    #[clap(value_parser = parse_entity)]
    pub entity: Entity,
    #[clap(flatten)]
    pub sources: Sources,
    /// Delay after the last typed line before matching rows are re-listed,
    /// such as "300ms". Defaults to the configured debounce.
    #[clap(long)]
    pub debounce: Option<humantime::Duration>,
}

impl Browse {
    pub async fn run(&self, ctx: &mut crate::CliContext) -> anyhow::Result<()> {
        if self.sources.input.as_os_str() == "-" {
            anyhow::bail!("browse reads search words from stdin, and --input cannot also be stdin");
        }
        let rows = Rows::load(self.entity, &self.sources)?;
        let debounce = match &self.debounce {
            Some(debounce) => **debounce,
            None => ctx.config().debounce(),
        };
        tracing::debug!(?debounce, rows = rows.len(), "browsing");

        let mut show = |line: &str| -> anyhow::Result<()> {
            let words = search::search_words(line);
            let summary = rows.write_matching(ctx, &words)?;
            eprintln!("{summary}");
            Ok(())
        };
        show("")?;

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        debounce_lines(stdin, debounce, show).await
    }
}

/// Read lines of `input`, calling `on_line` with the most recent line once
/// `debounce` has elapsed without a newer one. A line still pending at the
/// end of `input` is passed through immediately.
pub async fn debounce_lines<R, F>(input: R, debounce: Duration, mut on_line: F) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&str) -> anyhow::Result<()>,
{
    let mut lines = input.lines();
    let mut pending: Option<String> = None;

    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read search words")? {
                    Some(line) => {
                        pending = Some(line);
                        timer.as_mut().reset(tokio::time::Instant::now() + debounce);
                    }
                    None => break,
                }
            }
            () = &mut timer, if pending.is_some() => {
                if let Some(line) = pending.take() {
                    on_line(&line)?;
                }
            }
        }
    }

    if let Some(line) = pending.take() {
        on_line(&line)?;
    }
    Ok(())
}
