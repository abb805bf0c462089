//! Upload and images commands

use crate::audit::AuditLog;
use crate::auth::Authorizer;
use crate::cli::args::{ImagesArgs, OutputFormat, UploadArgs};
use crate::config::Config;
use crate::error::QuireResult;
use crate::media::MediaLibrary;
use crate::ui::{self, UiContext};
use serde_json::json;

/// Execute the upload command
pub async fn upload(args: UploadArgs, config: &Config, gate: &dyn Authorizer) -> QuireResult<()> {
    gate.authorize().await?;
    let ctx = UiContext::detect();

    let library = MediaLibrary::new(config.images_dir());
    let stored = library.import(&args.file).await?;

    AuditLog::new(config)
        .log(
            "image.uploaded",
            &json!({ "source": args.file, "stored": stored }),
        )
        .await;

    ui::step_ok_detail(
        &ctx,
        "Image uploaded successfully!",
        &stored.display().to_string(),
    );
    Ok(())
}

/// Execute the images command
pub async fn images(args: ImagesArgs, config: &Config) -> QuireResult<()> {
    let library = MediaLibrary::new(config.images_dir());
    let files = library.list().await?;
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Plain => {
            for name in &names {
                println!("{}", name);
            }
        }
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            if names.is_empty() {
                ui::step_info(&ctx, "No images uploaded");
                return Ok(());
            }
            ui::intro(&ctx, "Images");
            for name in &names {
                println!("  {}", name);
            }
            println!();
            println!("{} image(s) in {}", names.len(), library.dir().display());
        }
    }

    Ok(())
}
