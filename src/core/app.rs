use crate::{core::{config::Config, git::GitClient, path::PathHelper, svn::{Credentials, SvnClient}}, ui::display::AppUI};

pub struct App {
    pub ui: AppUI,
    pub config: Config,
    credentials: Option<Credentials>,
}

impl App {
    pub fn new(config: Config, credentials: Option<Credentials>) -> Self {
        App {
            ui: AppUI::new(),
            config,
            credentials,
        }
    }

    pub fn svn(&self) -> SvnClient {
        SvnClient::new(&self.config, self.credentials.clone())
    }

    pub fn git(&self) -> GitClient {
        GitClient::new(&self.config)
    }

    pub fn paths(&self) -> PathHelper {
        PathHelper::new(&self.config)
    }
}
