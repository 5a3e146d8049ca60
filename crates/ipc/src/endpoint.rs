//! Endpoint pair carrying envelopes between the two processes.
//!
//! Each side runs single-threaded; the channel between the ends is the
//! only concurrency boundary in the system. Fire-and-forget sends return
//! immediately. Requests block the calling side until the reply envelope
//! arrives; anything else received while blocked is buffered for the next
//! `poll`. There is deliberately no timeout layer on requests.

use crate::message::{app_info_envelope, Channel, Envelope, MenuCommand, Reply, RendererEvent, RendererRequest, SettingsRequest};
use crate::BusError;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use doc_model::AppInfo;
use log::{error, warn};
use std::collections::VecDeque;

type Responder<R> = Box<dyn FnMut(&R) -> Result<serde_json::Value, String> + Send>;

/// Creates a connected host/UI endpoint pair.
pub fn pair() -> (HostEndpoint, UiEndpoint) {
    let (host_tx, ui_rx) = unbounded();
    let (ui_tx, host_rx) = unbounded();

    let host = HostEndpoint {
        tx: host_tx,
        rx: host_rx,
        renderer_responder: None,
        settings_responder: None,
    };
    let ui = UiEndpoint { tx: ui_tx, rx: ui_rx, app_info: None, pending: VecDeque::new() };

    (host, ui)
}

/// The host process's end of the bus.
pub struct HostEndpoint {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    renderer_responder: Option<Responder<RendererRequest>>,
    settings_responder: Option<Responder<SettingsRequest>>,
}

impl HostEndpoint {
    pub fn send_app_info(&self, info: &AppInfo) -> Result<(), BusError> {
        let envelope = app_info_envelope(info)?;
        self.tx.send(envelope).map_err(|_| BusError::Disconnected)
    }

    pub fn send_command(&self, command: &MenuCommand) -> Result<(), BusError> {
        let envelope = Envelope::new(Channel::MenuCommand, command)?;
        self.tx.send(envelope).map_err(|_| BusError::Disconnected)
    }

    /// Registers the single responder for `RendererRequest`s. The protocol
    /// assumes exactly one; a second registration is a hard error.
    pub fn serve_renderer_requests<F>(&mut self, responder: F) -> Result<(), BusError>
    where
        F: FnMut(&RendererRequest) -> Result<serde_json::Value, String> + Send + 'static,
    {
        if self.renderer_responder.is_some() {
            return Err(BusError::ResponderAlreadyRegistered(Channel::RendererRequest));
        }

        self.renderer_responder = Some(Box::new(responder));
        Ok(())
    }

    /// Registers the single responder for the settings channel.
    pub fn serve_settings_requests<F>(&mut self, responder: F) -> Result<(), BusError>
    where
        F: FnMut(&SettingsRequest) -> Result<serde_json::Value, String> + Send + 'static,
    {
        if self.settings_responder.is_some() {
            return Err(BusError::ResponderAlreadyRegistered(Channel::Settings));
        }

        self.settings_responder = Some(Box::new(responder));
        Ok(())
    }

    /// Drains every envelope currently queued. Requests are answered
    /// inline through the registered responders; renderer events are
    /// returned for the caller to act on. Returns `Disconnected` once the
    /// UI end has gone away and the queue is empty.
    pub fn poll(&mut self) -> Result<Vec<RendererEvent>, BusError> {
        let mut events = Vec::new();

        loop {
            let envelope = match self.rx.try_recv() {
                Ok(envelope) => envelope,
                Err(TryRecvError::Empty) => return Ok(events),
                Err(TryRecvError::Disconnected) if events.is_empty() => {
                    return Err(BusError::Disconnected)
                }
                Err(TryRecvError::Disconnected) => return Ok(events),
            };

            match envelope.channel {
                Channel::RendererEvent => match envelope.decode::<RendererEvent>() {
                    Ok(event) => events.push(event),
                    Err(err) => error!("Unsupported RendererEvent - {err}; dropping message"),
                },
                Channel::RendererRequest => {
                    let reply = match envelope.decode::<RendererRequest>() {
                        Ok(request) => match self.renderer_responder.as_mut() {
                            Some(responder) => match responder(&request) {
                                Ok(value) => Reply::Ok(value),
                                Err(message) => Reply::Err(message),
                            },
                            None => {
                                warn!("No responder registered for '{}'", envelope.channel);
                                Reply::Err("no responder registered".to_owned())
                            }
                        },
                        Err(err) => {
                            error!("Unsupported RendererRequest - {err}; rejecting");
                            Reply::Err(format!("unsupported request: {err}"))
                        }
                    };
                    self.send_reply(&envelope, &reply);
                }
                Channel::Settings => {
                    let reply = match envelope.decode::<SettingsRequest>() {
                        Ok(request) => match self.settings_responder.as_mut() {
                            Some(responder) => match responder(&request) {
                                Ok(value) => Reply::Ok(value),
                                Err(message) => Reply::Err(message),
                            },
                            None => {
                                warn!("No responder registered for '{}'", envelope.channel);
                                Reply::Err("no responder registered".to_owned())
                            }
                        },
                        Err(err) => {
                            error!("Unsupported SettingsRequest - {err}; rejecting");
                            Reply::Err(format!("unsupported request: {err}"))
                        }
                    };
                    self.send_reply(&envelope, &reply);
                }
                Channel::AppInfo | Channel::MenuCommand => {
                    error!("Host received a host-bound message on '{}'", envelope.channel);
                }
            }
        }
    }

    fn send_reply(&self, request: &Envelope, reply: &Reply) {
        match Envelope::reply(request, reply) {
            Ok(envelope) => {
                if self.tx.send(envelope).is_err() {
                    error!("Failed to deliver reply on '{}': peer disconnected", request.channel);
                }
            }
            Err(err) => error!("Failed to encode reply on '{}': {err}", request.channel),
        }
    }
}

/// The UI process's end of the bus.
pub struct UiEndpoint {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    app_info: Option<AppInfo>,
    pending: VecDeque<Envelope>,
}

impl UiEndpoint {
    /// Application metadata delivered by the host at startup, if it has
    /// arrived yet.
    pub fn app_info(&self) -> Option<&AppInfo> {
        self.app_info.as_ref()
    }

    pub fn emit_event(&self, event: &RendererEvent) -> Result<(), BusError> {
        let envelope = Envelope::new(Channel::RendererEvent, event)?;
        self.tx.send(envelope).map_err(|_| BusError::Disconnected)
    }

    pub fn get_available_stylesheets(&mut self) -> Result<Vec<String>, BusError> {
        let value =
            self.request(Channel::RendererRequest, &RendererRequest::GetAvailableStylesheets)?;
        self.decode_reply(Channel::RendererRequest, value)
    }

    pub fn get_stylesheet(&mut self, filepath: &str) -> Result<String, BusError> {
        let request = RendererRequest::GetStylesheet { filepath: filepath.to_owned() };
        let value = self.request(Channel::RendererRequest, &request)?;
        self.decode_reply(Channel::RendererRequest, value)
    }

    pub fn get_settings(&mut self) -> Result<doc_model::Settings, BusError> {
        let value = self.request(Channel::Settings, &SettingsRequest::GetSettings)?;
        self.decode_reply(Channel::Settings, value)
    }

    /// Drains queued envelopes, returning the commands the host issued.
    /// Returns `Disconnected` once the host end has gone away and the
    /// queue is empty.
    pub fn poll(&mut self) -> Result<Vec<MenuCommand>, BusError> {
        let mut commands = Vec::new();

        loop {
            let envelope = match self.pending.pop_front() {
                Some(envelope) => envelope,
                None => match self.rx.try_recv() {
                    Ok(envelope) => envelope,
                    Err(TryRecvError::Empty) => return Ok(commands),
                    Err(TryRecvError::Disconnected) if commands.is_empty() => {
                        return Err(BusError::Disconnected)
                    }
                    Err(TryRecvError::Disconnected) => return Ok(commands),
                },
            };

            match envelope.channel {
                Channel::MenuCommand => match envelope.decode::<MenuCommand>() {
                    Ok(command) => commands.push(command),
                    Err(err) => error!("Unsupported MenuCommand - {err}; dropping message"),
                },
                Channel::AppInfo => match envelope.decode::<AppInfo>() {
                    Ok(info) => self.app_info = Some(info),
                    Err(err) => error!("Malformed AppInfo - {err}; dropping message"),
                },
                Channel::RendererRequest | Channel::Settings if envelope.correlation.is_some() => {
                    error!(
                        "Orphaned reply on '{}' (correlation {:?})",
                        envelope.channel, envelope.correlation
                    );
                }
                other => {
                    error!("UI received a UI-bound message on '{other}'");
                }
            }
        }
    }

    /// Sends a request and blocks until its reply arrives. Other traffic
    /// received while blocked is buffered for the next `poll`.
    fn request<T: serde::Serialize>(
        &mut self,
        channel: Channel,
        request: &T,
    ) -> Result<serde_json::Value, BusError> {
        let envelope = Envelope::new(channel, request)?;
        let id = envelope.id;
        self.tx.send(envelope).map_err(|_| BusError::Disconnected)?;

        loop {
            let incoming = self.rx.recv().map_err(|_| BusError::Disconnected)?;

            if incoming.channel == channel && incoming.correlation == Some(id) {
                let reply: Reply = incoming.decode().map_err(|err| {
                    BusError::UnsupportedMessage { channel, reason: err.to_string() }
                })?;

                return match reply {
                    Reply::Ok(value) => Ok(value),
                    Reply::Err(message) => Err(BusError::Rejected(message)),
                };
            }

            self.pending.push_back(incoming);
        }
    }

    fn decode_reply<T: serde::de::DeserializeOwned>(
        &self,
        channel: Channel,
        value: serde_json::Value,
    ) -> Result<T, BusError> {
        serde_json::from_value(value)
            .map_err(|err| BusError::UnsupportedMessage { channel, reason: err.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageId;
    use serde_json::json;
    use std::thread;
    use std::time::Duration;

    fn run_host(mut host: HostEndpoint) -> thread::JoinHandle<Vec<RendererEvent>> {
        thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                match host.poll() {
                    Ok(events) => {
                        seen.extend(events);
                        thread::sleep(Duration::from_millis(1));
                    }
                    Err(_) => return seen,
                }
            }
        })
    }

    #[test]
    fn request_blocks_until_the_host_replies() {
        let (mut host, mut ui) = pair();

        host.serve_renderer_requests(|request| match request {
            RendererRequest::GetAvailableStylesheets => Ok(json!(["(default)", "/a.css"])),
            RendererRequest::GetStylesheet { filepath } => Ok(json!(format!("/* {filepath} */"))),
        })
        .expect("registration should succeed");

        let server = run_host(host);

        let stylesheets = ui.get_available_stylesheets().expect("request should succeed");
        assert_eq!(stylesheets, vec!["(default)".to_owned(), "/a.css".to_owned()]);

        let css = ui.get_stylesheet("/a.css").expect("request should succeed");
        assert_eq!(css, "/* /a.css */");

        drop(ui);
        server.join().expect("host thread should exit");
    }

    #[test]
    fn responder_failure_rejects_the_request() {
        let (mut host, mut ui) = pair();

        host.serve_renderer_requests(|_| Err("stylesheet store offline".to_owned()))
            .expect("registration should succeed");

        let server = run_host(host);

        let err = ui.get_available_stylesheets().expect_err("request should be rejected");
        assert!(matches!(err, BusError::Rejected(message) if message.contains("offline")));

        drop(ui);
        server.join().expect("host thread should exit");
    }

    #[test]
    fn missing_responder_rejects_the_request() {
        let (host, mut ui) = pair();
        let server = run_host(host);

        let err = ui.get_available_stylesheets().expect_err("request should be rejected");
        assert!(matches!(err, BusError::Rejected(_)));

        drop(ui);
        server.join().expect("host thread should exit");
    }

    #[test]
    fn duplicate_responder_registration_is_a_hard_error() {
        let (mut host, _ui) = pair();

        host.serve_renderer_requests(|_| Ok(json!(null))).expect("first registration succeeds");
        let err = host
            .serve_renderer_requests(|_| Ok(json!(null)))
            .expect_err("second registration should fail");

        assert!(matches!(err, BusError::ResponderAlreadyRegistered(Channel::RendererRequest)));
    }

    #[test]
    fn commands_arriving_during_a_request_are_kept_for_the_next_poll() {
        let (host, mut ui) = pair();

        // Hand-rolled host: deliver a command before answering the request,
        // so the command lands while the UI side is blocked.
        let server = thread::spawn(move || {
            let request = host.rx.recv().expect("request should arrive");
            let command = Envelope::new(
                Channel::MenuCommand,
                &MenuCommand::SetStylesheet { value: "/a.css".to_owned() },
            )
            .expect("encode should succeed");
            host.tx.send(command).expect("send should succeed");

            let reply = Envelope::reply(&request, &Reply::Ok(json!(["(default)"])))
                .expect("encode should succeed");
            host.tx.send(reply).expect("send should succeed");
        });

        let stylesheets = ui.get_available_stylesheets().expect("request should succeed");
        assert_eq!(stylesheets, vec!["(default)".to_owned()]);

        let commands = ui.poll().expect("poll should succeed");
        assert_eq!(commands, vec![MenuCommand::SetStylesheet { value: "/a.css".to_owned() }]);

        server.join().expect("host thread should exit");
    }

    #[test]
    fn undecodable_event_is_dropped_without_poisoning_the_queue() {
        let (mut host, ui) = pair();

        let bogus = Envelope {
            id: MessageId::new(),
            channel: Channel::RendererEvent,
            correlation: None,
            payload: json!({ "event": "reticulate-splines" }),
        };
        ui.tx.send(bogus).expect("send should succeed");
        ui.emit_event(&RendererEvent::ModalOpened).expect("send should succeed");

        let events = host.poll().expect("poll should succeed");
        assert_eq!(events, vec![RendererEvent::ModalOpened]);
    }

    #[test]
    fn events_flow_host_ward() {
        let (mut host, ui) = pair();

        ui.emit_event(&RendererEvent::ModalOpened).expect("send should succeed");
        ui.emit_event(&RendererEvent::ModalClosed).expect("send should succeed");

        let events = host.poll().expect("poll should succeed");
        assert_eq!(events, vec![RendererEvent::ModalOpened, RendererEvent::ModalClosed]);
    }

    #[test]
    fn app_info_is_captured_by_poll() {
        let (host, mut ui) = pair();

        host.send_app_info(&AppInfo { app_name: "Markdown Editor".to_owned() })
            .expect("send should succeed");

        ui.poll().expect("poll should succeed");
        assert_eq!(
            ui.app_info().map(|info| info.app_name.as_str()),
            Some("Markdown Editor")
        );
    }
}
