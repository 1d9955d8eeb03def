//! Event dispatcher
//!
//! Fans a classified scan out to the notifier channels and the actuator
//! link. Nothing here returns an error: a failing channel is logged and the
//! remaining channels still run.

use super::operator::OperatorCommand;
use crate::link::{CommandLink, LinkMessage};
use crate::notify::{AudioCue, Overlay, Status, StatusDisplay, StatusLevel};
use crate::scan::{Classification, ScanEvent};
use log::{debug, error, info, warn};

pub const STATUS_SCANNED: &str = "Code scanned successfully";
pub const STATUS_UNKNOWN: &str = "Unrecognized code";
pub const STATUS_DUPLICATE: &str = "Same code detected, waiting for a new code";
pub const STATUS_IDLE: &str = "No code detected";

pub struct EventDispatcher {
    audio: Box<dyn AudioCue>,
    status: Box<dyn StatusDisplay>,
    overlay: Box<dyn Overlay>,
    link: CommandLink,
    link_failures: u64,
}

impl EventDispatcher {
    pub fn new(
        audio: Box<dyn AudioCue>,
        status: Box<dyn StatusDisplay>,
        overlay: Box<dyn Overlay>,
        link: CommandLink,
    ) -> Self {
        Self {
            audio,
            status,
            overlay,
            link,
            link_failures: 0,
        }
    }

    /// Run the side effects for one classified observation
    pub fn dispatch(&mut self, event: &ScanEvent) {
        match event.classification {
            Classification::New => {
                info!("New code: {} at {}", event.code, event.at);
                report("audio cue", self.audio.play());

                match &event.record {
                    Some(record) => {
                        report(
                            "status display",
                            self.status
                                .set_status(&Status::new(STATUS_SCANNED, StatusLevel::Success)),
                        );
                        report("status display", self.status.show_record(record));
                        report("overlay", self.overlay.mark(&event.code, &event.geometry));
                        self.send(LinkMessage::Qr);
                    }
                    None => {
                        warn!("Code {} has no record", event.code);
                        report(
                            "status display",
                            self.status
                                .set_status(&Status::new(STATUS_UNKNOWN, StatusLevel::Error)),
                        );
                    }
                }
            }
            Classification::Repeated => {
                report(
                    "status display",
                    self.status
                        .set_status(&Status::new(STATUS_DUPLICATE, StatusLevel::Warning)),
                );
            }
            Classification::Suppressed => {
                debug!("Suppressed {} inside cooldown", event.code);
            }
        }
    }

    /// Nothing was in view this cycle
    pub fn dispatch_idle(&mut self) {
        report(
            "status display",
            self.status
                .set_status(&Status::new(STATUS_IDLE, StatusLevel::Info)),
        );
    }

    /// Forward an operator command: status line plus its fixed verb
    pub fn dispatch_command(&mut self, command: OperatorCommand) {
        info!("Operator command: {:?}", command);
        report("status display", self.status.set_status(&command.status()));
        self.send(command.link_message());
    }

    pub fn overlay(&self) -> &dyn Overlay {
        self.overlay.as_ref()
    }

    pub fn clear_overlay(&mut self) {
        self.overlay.clear();
    }

    pub fn link(&self) -> &CommandLink {
        &self.link
    }

    pub fn close_link(&mut self) {
        self.link.close();
    }

    pub fn link_failures(&self) -> u64 {
        self.link_failures
    }

    fn send(&mut self, message: LinkMessage) {
        if let Err(e) = self.link.send(message) {
            self.link_failures += 1;
            error!("{}", e);
        }
    }
}

fn report(channel: &str, result: anyhow::Result<()>) {
    if let Err(e) = result {
        error!("Notifier {} failed: {:#}", channel, e);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::link::tests::FakePort;
    use crate::notify::{MarkLayer, OverlayMark};
    use crate::pipeline::types::{Geometry, Timestamp};
    use crate::scan::{Record, RecordDirectory};
    use anyhow::anyhow;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared journal of notifier side effects
    pub(crate) type Journal = Rc<RefCell<Vec<String>>>;

    pub(crate) struct FakeAudio {
        pub journal: Journal,
        pub fail: bool,
    }

    impl AudioCue for FakeAudio {
        fn play(&mut self) -> anyhow::Result<()> {
            if self.fail {
                return Err(anyhow!("no sound card"));
            }
            self.journal.borrow_mut().push("beep".to_string());
            Ok(())
        }
    }

    pub(crate) struct FakeStatus {
        pub journal: Journal,
    }

    impl StatusDisplay for FakeStatus {
        fn set_status(&mut self, status: &Status) -> anyhow::Result<()> {
            self.journal.borrow_mut().push(format!("status: {}", status.text));
            Ok(())
        }

        fn show_record(&mut self, record: &Record) -> anyhow::Result<()> {
            self.journal.borrow_mut().push(format!("record: {}", record.name));
            Ok(())
        }
    }

    /// Overlay that journals marks and otherwise behaves like `MarkLayer`
    pub(crate) struct FakeOverlay {
        pub journal: Journal,
        pub inner: MarkLayer,
    }

    impl Overlay for FakeOverlay {
        fn mark(&mut self, text: &str, geometry: &Geometry) -> anyhow::Result<()> {
            self.journal.borrow_mut().push(format!("overlay: {}", text));
            self.inner.mark(text, geometry)
        }

        fn marks(&self) -> &[OverlayMark] {
            self.inner.marks()
        }

        fn clear(&mut self) {
            self.inner.clear()
        }
    }

    pub(crate) fn dispatcher(journal: &Journal, link: CommandLink) -> EventDispatcher {
        EventDispatcher::new(
            Box::new(FakeAudio {
                journal: journal.clone(),
                fail: false,
            }),
            Box::new(FakeStatus {
                journal: journal.clone(),
            }),
            Box::new(FakeOverlay {
                journal: journal.clone(),
                inner: MarkLayer::new(),
            }),
            link,
        )
    }

    fn event(code: &str, classification: Classification) -> ScanEvent {
        ScanEvent {
            code: code.to_string(),
            record: RecordDirectory::builtin().resolve(code).cloned(),
            classification,
            geometry: Geometry::Rect {
                x: 10,
                y: 10,
                width: 80,
                height: 80,
            },
            at: Timestamp::from_secs(1),
        }
    }

    #[test]
    fn test_new_known_code_fans_out_everywhere() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        dispatcher.dispatch(&event("Patient 1", Classification::New));

        assert_eq!(
            *journal.borrow(),
            vec![
                "beep",
                "status: Code scanned successfully",
                "record: Patient A",
                "overlay: Patient 1",
            ]
        );
        assert_eq!(port.lines(), vec!["qr"]);
        assert_eq!(dispatcher.overlay().marks().len(), 1);
    }

    #[test]
    fn test_new_unknown_code_beeps_without_link_message() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        dispatcher.dispatch(&event("Patient 9", Classification::New));

        assert_eq!(*journal.borrow(), vec!["beep", "status: Unrecognized code"]);
        assert!(port.lines().is_empty());
        assert!(dispatcher.overlay().marks().is_empty());
    }

    #[test]
    fn test_repeated_only_updates_status() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        dispatcher.dispatch(&event("Patient 1", Classification::Repeated));

        assert_eq!(
            *journal.borrow(),
            vec!["status: Same code detected, waiting for a new code"]
        );
        assert!(port.lines().is_empty());
    }

    #[test]
    fn test_suppressed_has_no_visible_effect() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        dispatcher.dispatch(&event("Patient 2", Classification::Suppressed));

        assert!(journal.borrow().is_empty());
        assert!(port.lines().is_empty());
    }

    #[test]
    fn test_unavailable_link_still_notifies() {
        let journal = Journal::default();
        let mut dispatcher =
            dispatcher(&journal, CommandLink::unavailable("/dev/ttyUSB0", "not attached"));

        dispatcher.dispatch(&event("Patient 1", Classification::New));
        dispatcher.dispatch(&event("Patient 2", Classification::New));

        let journal = journal.borrow();
        assert_eq!(journal.iter().filter(|e| *e == "beep").count(), 2);
        assert!(journal.contains(&"status: Code scanned successfully".to_string()));
        assert_eq!(dispatcher.link_failures(), 0);
    }

    #[test]
    fn test_write_failure_does_not_block_later_dispatches() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        port.set_broken(true);
        dispatcher.dispatch(&event("Patient 1", Classification::New));
        assert_eq!(dispatcher.link_failures(), 1);
        assert!(journal.borrow().contains(&"record: Patient A".to_string()));

        port.set_broken(false);
        dispatcher.dispatch(&event("Patient 2", Classification::New));
        dispatcher.dispatch_command(OperatorCommand::NextSong);

        assert_eq!(port.lines(), vec!["qr", "next_song"]);
        assert_eq!(dispatcher.link_failures(), 1);
    }

    #[test]
    fn test_failing_audio_does_not_stop_other_channels() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = EventDispatcher::new(
            Box::new(FakeAudio {
                journal: journal.clone(),
                fail: true,
            }),
            Box::new(FakeStatus {
                journal: journal.clone(),
            }),
            Box::new(MarkLayer::new()),
            CommandLink::from_writer("fake", port.clone()),
        );

        dispatcher.dispatch(&event("Patient 4", Classification::New));

        assert_eq!(
            *journal.borrow(),
            vec!["status: Code scanned successfully", "record: Patient D"]
        );
        assert_eq!(port.lines(), vec!["qr"]);
    }

    #[test]
    fn test_operator_commands_map_to_verbs() {
        let journal = Journal::default();
        let port = FakePort::default();
        let mut dispatcher = dispatcher(&journal, CommandLink::from_writer("fake", port.clone()));

        for command in OperatorCommand::ALL {
            dispatcher.dispatch_command(command);
        }
        dispatcher.dispatch_idle();

        assert_eq!(
            port.lines(),
            vec!["start", "speed_high", "speed_medium", "speed_low", "next_song"]
        );
        assert_eq!(
            *journal.borrow(),
            vec![
                "status: Robot started",
                "status: Speed set to HIGH",
                "status: Speed set to MEDIUM",
                "status: Speed set to LOW",
                "status: Playing next song",
                "status: No code detected",
            ]
        );
    }
}
