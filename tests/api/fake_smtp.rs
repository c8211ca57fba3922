use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, Copy)]
pub enum AuthBehaviour {
    Accept,
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct ReceivedMail {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
}

impl ReceivedMail {
    /// Value of the first header called `name`, unfolded headers only.
    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.data
            .lines()
            .take_while(|line| !line.is_empty())
            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

#[derive(Default)]
struct Recorded {
    connections: usize,
    mails: Vec<ReceivedMail>,
}

/// Plain-text SMTP server on a random local port that records what it is sent.
pub struct FakeSmtpServer {
    pub port: u16,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeSmtpServer {
    pub async fn start(auth: AuthBehaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake SMTP server");
        let port = listener.local_addr().unwrap().port();
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        let shared = Arc::clone(&recorded);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                shared.lock().unwrap().connections += 1;
                tokio::spawn(session(socket, auth, Arc::clone(&shared)));
            }
        });

        Self { port, recorded }
    }

    pub fn connections(&self) -> usize {
        self.recorded.lock().unwrap().connections
    }

    pub fn received(&self) -> Vec<ReceivedMail> {
        self.recorded.lock().unwrap().mails.clone()
    }
}

async fn session(
    socket: TcpStream,
    auth: AuthBehaviour,
    recorded: Arc<Mutex<Recorded>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut mail = ReceivedMail::default();

    writer.write_all(b"220 fake.smtp ESMTP ready\r\n").await?;

    while let Some(line) = lines.next_line().await? {
        let command = line.to_ascii_uppercase();

        let reply: &[u8] = if command.starts_with("EHLO") {
            b"250-fake.smtp\r\n250 AUTH PLAIN\r\n"
        } else if command.starts_with("HELO") {
            b"250 fake.smtp\r\n"
        } else if command.starts_with("AUTH") {
            match auth {
                AuthBehaviour::Accept => b"235 2.7.0 Authentication successful\r\n",
                AuthBehaviour::Reject => b"535 5.7.8 Authentication credentials invalid\r\n",
            }
        } else if command.starts_with("MAIL FROM:") {
            mail.mail_from = line["MAIL FROM:".len()..].trim().to_string();
            b"250 2.1.0 OK\r\n"
        } else if command.starts_with("RCPT TO:") {
            mail.rcpt_to.push(line["RCPT TO:".len()..].trim().to_string());
            b"250 2.1.5 OK\r\n"
        } else if command == "DATA" {
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
            while let Some(data_line) = lines.next_line().await? {
                if data_line == "." {
                    break;
                }
                mail.data.push_str(&data_line);
                mail.data.push('\n');
            }
            recorded
                .lock()
                .unwrap()
                .mails
                .push(std::mem::take(&mut mail));
            b"250 2.0.0 OK queued\r\n"
        } else if command == "QUIT" {
            writer.write_all(b"221 2.0.0 Bye\r\n").await?;
            break;
        } else {
            // NOOP, RSET and anything else.
            b"250 2.0.0 OK\r\n"
        };

        writer.write_all(reply).await?;
    }

    Ok(())
}
