use std::path::PathBuf;

use clap::Parser;
use parlor::prelude::*;

/// Room server for the imposter party game.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "PARLOR_BIND", default_value = parlor::DEFAULT_BIND_ADDR)]
    bind: String,

    /// File of candidate secret words, one per line (`#` starts a comment)
    #[arg(short, long, env = "PARLOR_WORDS")]
    words: Option<PathBuf>,

    /// Who receives GET_ADMIN answers: broadcast or requester
    #[arg(long, env = "PARLOR_QUERY_REPLIES", default_value_t = QueryReplyMode::Broadcast)]
    query_replies: QueryReplyMode,

    /// Fixed seed for imposter and word selection
    #[arg(long, env = "PARLOR_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    parlor::logging::init(parlor::logging::DEFAULT_FILTER);

    let words = match &args.words {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            let words = WordList::from_lines(&text).map_err(ParlorError::from)?;
            tracing::info!(path = %path.display(), count = words.len(), "loaded word list");
            words
        }
        None => WordList::default(),
    };

    let server = ParlorServer::builder()
        .bind(&args.bind)
        .room_config(RoomConfig {
            words,
            query_replies: args.query_replies,
            seed: args.seed,
            ..RoomConfig::default()
        })
        .build()
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
