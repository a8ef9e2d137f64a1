use std::{error::Error, fs::File, io::BufReader, sync::Arc};

use log::{error, info};
use tokio::task::JoinSet;
use toot_embed::{
    config::{Command, Config},
    html, Embedder, Marker,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();

    let mut embedder = Embedder::new(&config.client_options())?;
    if let Some(locale) = config.locale()? {
        embedder = embedder.locale(locale);
    }
    if let Some(date_format) = config.date_format()? {
        embedder = embedder.date_format(date_format);
    }

    let markers: Vec<Marker> = match config.command.clone() {
        Command::Feed(args) => vec![args.into()],
        Command::Thread(args) => vec![args.into()],
        Command::Batch { file } => {
            info!("Loading markers from {}", file.display());
            serde_json::from_reader(BufReader::new(File::open(&file)?))?
        }
    };

    let total = markers.len();
    let embedder = Arc::new(embedder);
    let mut tasks = JoinSet::new();
    for (index, marker) in markers.into_iter().enumerate() {
        let embedder = embedder.clone();
        tasks.spawn(async move {
            let result = embedder.load(&marker).await;
            (index, marker, result)
        });
    }

    // Markers finish in any order; one failing leaves the others alone.
    let mut failed = 0;
    while let Some(joined) = tasks.join_next().await {
        let (index, marker, result) = joined?;
        match result {
            Ok(replacement) => {
                info!("#{} {}: {} toots", index, marker.href, replacement.count);
                if total > 1 {
                    print!("{}", html!("<!-- marker {}: {} -->\n", index.to_string(), &marker.href));
                }
                print!("{}", replacement.to_html());
            }
            Err(e) => {
                failed += 1;
                error!("#{} {}: {}", index, marker.href, report(&e));
            }
        }
    }

    info!("{} markers, {} failed", total, failed);
    if failed > 0 {
        return Err(format!("{failed} of {total} markers failed").into());
    }
    Ok(())
}

fn report(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
