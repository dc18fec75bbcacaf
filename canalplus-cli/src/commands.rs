use canalplus_catalog::{CatalogClient, ProgramList, SearchQuery, Selection, Video, VideoList};
use canalplus_engine::{DownloadOutcome, Downloader, play};
use tracing::{debug, info};

use crate::cli::{Mode, OutputTarget, ProgramSelector};
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::menu::{capwords, choose, print_menu};

/// Runs one invocation: pick a selection, pick videos, process them in order.
pub struct CommandExecutor {
    catalog: CatalogClient,
    downloader: Downloader,
    output: OutputTarget,
    verbose: bool,
}

impl CommandExecutor {
    pub fn new(
        config: &AppConfig,
        output: OutputTarget,
        verbose: bool,
        quiet: bool,
    ) -> Result<Self> {
        let catalog = CatalogClient::new(config.catalog_config()?)?;
        let downloader = Downloader::new(
            catalog.clone(),
            config.download_config(quiet)?,
            config.remux_config(verbose),
        );
        Ok(Self {
            catalog,
            downloader,
            output,
            verbose,
        })
    }

    pub async fn run(&self, mode: Mode, selector: Option<&ProgramSelector>) -> Result<()> {
        let selection = self.select(selector).await?;
        debug!(%selection, %mode, "Selection made");
        let videos = self.list_videos(&selection).await?;

        match mode {
            Mode::Auto => {
                info!("{}", auto_banner(&selection));
                let count = videos.len();
                for (i, video) in videos.iter().enumerate() {
                    info!(
                        "[Automatic mode] Getting video {}/{count} : '{}'",
                        i + 1,
                        video.title()
                    );
                    self.process(video).await?;
                }
            }
            Mode::Last => {
                if let Some(video) = videos.first() {
                    info!("{}", last_banner(&selection, video.title()));
                    self.process(video).await?;
                }
            }
            Mode::Manual => {
                print_menu(videos.iter().map(Video::title));
                let index = choose(videos.len()).await?;
                if let Some(video) = videos.get(index) {
                    self.process(video).await?;
                }
            }
        }
        Ok(())
    }

    async fn select(&self, selector: Option<&ProgramSelector>) -> Result<Selection> {
        match selector {
            Some(ProgramSelector::Search(query)) => {
                Ok(Selection::Search(SearchQuery::new(query)))
            }
            Some(ProgramSelector::Title(title)) => {
                let programs = ProgramList::fetch(&self.catalog).await?;
                programs
                    .find(title)
                    .cloned()
                    .map(Selection::Program)
                    .ok_or_else(|| AppError::UnknownProgram(title.clone()))
            }
            None => {
                let programs = ProgramList::fetch(&self.catalog).await?;
                let titles: Vec<String> = programs.iter().map(|p| capwords(&p.title)).collect();
                print_menu(titles.iter().map(String::as_str));
                let index = choose(programs.len()).await?;
                programs
                    .get(index)
                    .cloned()
                    .map(Selection::Program)
                    .ok_or_else(|| AppError::Prompt(format!("no program at index {index}")))
            }
        }
    }

    async fn list_videos(&self, selection: &Selection) -> Result<VideoList> {
        let videos = selection.videos(&self.catalog).await?;
        if videos.is_empty() {
            return Err(AppError::NoVideos(selection.to_string()));
        }
        Ok(videos)
    }

    async fn process(&self, video: &Video) -> Result<()> {
        match &self.output {
            OutputTarget::Directory(dir) => {
                let outcome = self.downloader.download(video, dir).await?;
                if let DownloadOutcome::Raw(path) = &outcome {
                    debug!("Kept unconverted file '{}'", path.display());
                }
            }
            OutputTarget::Player(player) => {
                let url = video.resolve_stream_url(&self.catalog).await?;
                play(player, url, self.verbose).await?;
            }
        }
        Ok(())
    }
}

fn auto_banner(selection: &Selection) -> String {
    match selection {
        Selection::Program(program) => format!(
            "[Automatic mode] Getting all videos of program '{}'",
            program.title
        ),
        Selection::Search(search) => format!(
            "[Automatic mode] Getting all videos for query '{}'",
            search.query
        ),
    }
}

fn last_banner(selection: &Selection, video_title: &str) -> String {
    match selection {
        Selection::Program(program) => format!(
            "[Last video mode] Getting last video of program '{}': '{video_title}'",
            program.title
        ),
        Selection::Search(search) => format!(
            "[Last video mode] Getting first search result for query '{}': '{video_title}'",
            search.query
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use canalplus_catalog::Program;
    use tokio::net::TcpListener;

    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new()
            .route(
                "/rest/initPlayer/cplus/",
                get(|| async {
                    "<INIT_PLAYER><THEMATIQUES><THEMATIQUE><SELECTIONS>\
                     <SELECTION><ID>7</ID><NOM>Zapping</NOM></SELECTION>\
                     </SELECTIONS></THEMATIQUE></THEMATIQUES></INIT_PLAYER>"
                }),
            )
            .route("/rest/getMEAs/cplus/{id}", get(|| async { "<MEAS></MEAS>" }))
            .route("/rest/search/cplus/{query}", get(|| async { "<VIDEOS></VIDEOS>" }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/rest")
    }

    async fn executor() -> (CommandExecutor, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            api_base_url: serve().await,
            progress_style: "none".to_string(),
            ..Default::default()
        };
        let executor = CommandExecutor::new(
            &config,
            OutputTarget::Directory(dir.path().to_path_buf()),
            false,
            true,
        )
        .unwrap();
        (executor, dir)
    }

    #[test]
    fn test_mode_banners() {
        let program = Selection::Program(Program::new("7", "Zapping"));
        let search = Selection::Search(SearchQuery::new("foot"));
        assert_eq!(
            auto_banner(&program),
            "[Automatic mode] Getting all videos of program 'Zapping'"
        );
        assert_eq!(
            auto_banner(&search),
            "[Automatic mode] Getting all videos for query 'foot'"
        );
        assert_eq!(
            last_banner(&program, "Zapping du 12/03"),
            "[Last video mode] Getting last video of program 'Zapping': 'Zapping du 12/03'"
        );
        assert_eq!(
            last_banner(&search, "But!"),
            "[Last video mode] Getting first search result for query 'foot': 'But!'"
        );
    }

    #[tokio::test]
    async fn test_unknown_program() {
        let (executor, _dir) = executor().await;
        let err = executor
            .run(Mode::Auto, Some(&ProgramSelector::Title("Zaping".into())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown program 'Zaping'");
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_empty_listings_are_errors() {
        let (executor, _dir) = executor().await;
        let err = executor
            .run(Mode::Last, Some(&ProgramSelector::Title("zapping".into())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No videos for program 'Zapping'");

        let err = executor
            .run(Mode::Manual, Some(&ProgramSelector::Search("nothing".into())))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No videos for search 'nothing'");
    }
}
