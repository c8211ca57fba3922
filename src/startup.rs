use std::net::TcpListener;

use actix_web::dev::Server;

use crate::{configuration::Settings, domain::templates, run};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    /// Binds the listener; port `0` picks a free one, reported back in `port`.
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let address = (config.application.host, config.application.port);
        let templates = templates()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, config.relay, templates)?;

        Ok(Self { port, server })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
