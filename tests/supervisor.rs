mod tests {
    use std::thread;
    use std::time::{Duration as StdDuration, Instant as StdInstant};

    use backlight_composer::color::hue_to_rgb;
    use backlight_composer::{
        AnimationSupervisor, Color, Command, Duration, EngineConfig, EngineState, Error, Mode,
        RecordingWriter, StateEvent, StateSnapshot, Transition,
    };

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    const RED: Color = Color { r: 255, g: 0, b: 0 };
    const BLUE: Color = Color { r: 0, g: 0, b: 255 };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config(rainbow_interval_ms: u64) -> EngineConfig {
        EngineConfig::default()
            .with_transition(Duration::from_millis(150), Duration::from_millis(10))
            .with_rainbow(Duration::from_millis(rainbow_interval_ms), 1)
    }

    fn wait_for(mut condition: impl FnMut() -> bool) {
        let deadline = StdInstant::now() + StdDuration::from_secs(5);
        while !condition() {
            assert!(StdInstant::now() < deadline, "condition not reached in time");
            thread::sleep(StdDuration::from_millis(1));
        }
    }

    #[test]
    fn test_static_transition_from_black_to_red() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(10)).unwrap();

        let started = StdInstant::now();
        supervisor.submit(Command::SetStatic(RED)).unwrap();
        let state = supervisor.wait_idle().unwrap();

        assert!(started.elapsed() >= StdDuration::from_millis(150));
        assert_eq!(state, EngineState::Idle { color: RED });
        let colors = recording.colors();
        assert_eq!(colors.len(), 16);
        assert_eq!(colors[0], BLACK);
        assert_eq!(colors[15], RED);
        assert!(colors.windows(2).all(|pair| pair[1].r > pair[0].r));
        assert!(colors.iter().all(|color| color.g == 0 && color.b == 0));
        assert!(!supervisor.is_animating());
    }

    #[test]
    fn test_stop_after_three_rainbow_ticks() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(100)).unwrap();

        supervisor.submit(Command::SetRainbow).unwrap();
        assert!(supervisor.is_animating());
        wait_for(|| recording.len() >= 3);
        supervisor.submit(Command::Stop).unwrap();

        assert_eq!(
            recording.colors(),
            vec![hue_to_rgb(0), hue_to_rgb(1), hue_to_rgb(2)]
        );
        assert_eq!(
            supervisor.current_state(),
            EngineState::Idle {
                color: hue_to_rgb(2)
            }
        );
        assert!(!supervisor.is_animating());

        // Stop keeps the mode for persistence
        let snapshot = supervisor.snapshot();
        assert_eq!(snapshot.mode, Mode::Rainbow);
        assert_eq!(snapshot.last_color, hue_to_rgb(2));
    }

    #[test]
    fn test_stop_holds_last_written_color() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(5)).unwrap();

        supervisor.submit(Command::SetRainbow).unwrap();
        wait_for(|| recording.len() >= 10);
        supervisor.submit(Command::Stop).unwrap();

        let written = recording.len();
        let last = recording.last().unwrap();
        assert_eq!(supervisor.current_state(), EngineState::Idle { color: last });

        thread::sleep(StdDuration::from_millis(30));
        assert_eq!(recording.len(), written, "frames written after stop");
    }

    #[test]
    fn test_new_command_replaces_running_animation() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(5)).unwrap();

        supervisor.submit(Command::SetRainbow).unwrap();
        wait_for(|| recording.len() >= 4);
        supervisor.submit(Command::SetStatic(BLUE)).unwrap();
        assert!(matches!(
            supervisor.current_state(),
            EngineState::Transitioning { to, .. } if to == BLUE
        ));

        assert_eq!(supervisor.wait_idle().unwrap(), EngineState::Idle { color: BLUE });

        // Rainbow frames, then exactly one transition starting where the
        // rainbow stopped
        let colors = recording.colors();
        let split = colors.len() - 16;
        let rainbow_last = colors[split - 1];
        let expected: Vec<_> = Transition::new(
            rainbow_last,
            BLUE,
            &supervisor.config().transition,
        )
        .frames()
        .map(|frame| frame.color)
        .collect();
        assert_eq!(&colors[split..], expected.as_slice());
        assert!(colors[..split]
            .iter()
            .enumerate()
            .all(|(index, color)| *color == hue_to_rgb(index as u16)));
    }

    #[test]
    fn test_repeated_commands_leave_one_animation() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(5)).unwrap();

        for _ in 0..5 {
            supervisor.submit(Command::SetRainbow).unwrap();
            supervisor.submit(Command::SetStatic(RED)).unwrap();
        }
        supervisor.submit(Command::SetRainbow).unwrap();
        assert!(supervisor.is_animating());
        assert!(matches!(supervisor.current_state(), EngineState::Rainbow { .. }));

        supervisor.submit(Command::Stop).unwrap();
        assert!(!supervisor.is_animating());
        assert!(supervisor.current_state().is_idle());
    }

    #[test]
    fn test_static_same_color_reasserts_device() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(10)).unwrap();

        supervisor.submit(Command::SetStatic(RED)).unwrap();
        supervisor.wait_idle().unwrap();
        recording.clear();

        supervisor.submit(Command::SetStatic(RED)).unwrap();
        supervisor.wait_idle().unwrap();
        assert_eq!(recording.colors(), vec![RED]);
    }

    #[test]
    fn test_device_fault_falls_back_to_idle() {
        init_logger();
        let recording = RecordingWriter::new().failing_after(3);
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(5)).unwrap();
        let events = supervisor.subscribe();

        supervisor.submit(Command::SetRainbow).unwrap();
        wait_for(|| !supervisor.is_animating());

        let last = recording.last().unwrap();
        assert_eq!(recording.len(), 3);
        assert_eq!(supervisor.current_state(), EngineState::Idle { color: last });

        let fault = events
            .drain()
            .find_map(|event| match event {
                StateEvent::DeviceFault(fault) => Some(fault),
                StateEvent::Changed(_) => None,
            })
            .expect("fault event");
        assert_eq!(fault.last_color, last);
        assert_eq!(fault.kind, Some(std::io::ErrorKind::NotFound));

        match supervisor.wait_idle() {
            Err(Error::Device(reported)) => assert_eq!(reported, fault),
            other => panic!("expected device fault, got {other:?}"),
        }
        assert_eq!(supervisor.take_fault(), None);

        // The process keeps going, the user may retry
        supervisor.submit(Command::SetStatic(BLUE)).unwrap();
        assert!(matches!(supervisor.wait_idle(), Err(Error::Device(_))));
        assert_eq!(supervisor.current_state(), EngineState::Idle { color: last });
    }

    #[test]
    fn test_events_follow_commands() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording, config(10)).unwrap();
        let events = supervisor.subscribe();

        supervisor.submit(Command::SetStatic(RED)).unwrap();
        supervisor.wait_idle().unwrap();

        let events: Vec<_> = events.drain().collect();
        assert_eq!(
            events,
            vec![
                StateEvent::Changed(StateSnapshot {
                    mode: Mode::Static,
                    last_color: BLACK,
                    static_color: RED,
                }),
                StateEvent::Changed(StateSnapshot {
                    mode: Mode::Static,
                    last_color: RED,
                    static_color: RED,
                }),
            ]
        );
    }

    #[test]
    fn test_every_subscriber_sees_every_event() {
        init_logger();
        let mut supervisor = AnimationSupervisor::new(RecordingWriter::new(), config(10)).unwrap();
        let ui = supervisor.subscribe();
        let persistence = supervisor.subscribe();
        let dropped = supervisor.subscribe();
        drop(dropped);

        supervisor.submit(Command::SetStatic(RED)).unwrap();
        supervisor.wait_idle().unwrap();

        let ui_events: Vec<_> = ui.drain().collect();
        let persisted: Vec<_> = persistence.drain().collect();
        assert_eq!(ui_events.len(), 2);
        assert_eq!(ui_events, persisted);
        assert_eq!(
            persisted.last(),
            Some(&StateEvent::Changed(StateSnapshot {
                mode: Mode::Static,
                last_color: RED,
                static_color: RED,
            }))
        );
    }

    #[test]
    fn test_waiting_subscriber_wakes_on_submit() {
        init_logger();
        let mut supervisor = AnimationSupervisor::new(RecordingWriter::new(), config(10)).unwrap();
        let events = supervisor.subscribe();

        let waiting = thread::spawn(move || {
            let started = StdInstant::now();
            let event = events.receive_timeout(Duration::from_secs(5));
            (event, started.elapsed())
        });
        thread::sleep(StdDuration::from_millis(20));
        supervisor.submit(Command::SetStatic(RED)).unwrap();

        let (event, waited) = waiting.join().unwrap();
        assert_eq!(
            event,
            Some(StateEvent::Changed(StateSnapshot {
                mode: Mode::Static,
                last_color: BLACK,
                static_color: RED,
            }))
        );
        assert!(waited < StdDuration::from_secs(5));
    }

    #[test]
    fn test_stop_mid_transition_holds_last_written_frame() {
        init_logger();
        let recording = RecordingWriter::new();
        let config = EngineConfig::default()
            .with_transition(Duration::from_millis(300), Duration::from_millis(10));
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config).unwrap();

        supervisor.submit(Command::SetStatic(RED)).unwrap();
        thread::sleep(StdDuration::from_millis(75));
        supervisor.submit(Command::Stop).unwrap();

        let planned: Vec<_> = Transition::new(BLACK, RED, &supervisor.config().transition)
            .frames()
            .map(|frame| frame.color)
            .collect();
        let colors = recording.colors();
        assert!(!colors.is_empty());
        assert!(colors.len() < planned.len(), "transition was not interrupted");
        assert_eq!(colors.as_slice(), &planned[..colors.len()]);

        let last = recording.last().unwrap();
        assert_eq!(supervisor.current_state(), EngineState::Idle { color: last });
        assert_eq!(supervisor.snapshot().last_color, last);
        assert_eq!(supervisor.snapshot().static_color, RED);
    }

    #[test]
    fn test_resume_restores_persisted_mode() {
        init_logger();
        let recording = RecordingWriter::new();
        let snapshot = StateSnapshot {
            mode: Mode::Rainbow,
            last_color: RED,
            static_color: RED,
        };
        let mut supervisor =
            AnimationSupervisor::with_snapshot(recording.clone(), config(5), snapshot).unwrap();
        assert_eq!(supervisor.current_state(), EngineState::Idle { color: RED });
        assert!(recording.is_empty());

        supervisor.resume().unwrap();
        assert!(supervisor.is_animating());
        wait_for(|| !recording.is_empty());
        assert_eq!(recording.colors()[0], hue_to_rgb(0));

        supervisor.submit(Command::SetStatic(BLUE)).unwrap();
        supervisor.wait_idle().unwrap();
        supervisor.submit(Command::Stop).unwrap();

        let mut supervisor = AnimationSupervisor::with_snapshot(
            RecordingWriter::new(),
            config(5),
            supervisor.snapshot(),
        )
        .unwrap();
        supervisor.resume().unwrap();
        assert_eq!(supervisor.wait_idle().unwrap(), EngineState::Idle { color: BLUE });
    }

    #[test]
    fn test_wait_idle_does_not_block_on_rainbow() {
        init_logger();
        let mut supervisor = AnimationSupervisor::new(RecordingWriter::new(), config(5)).unwrap();
        supervisor.submit(Command::SetRainbow).unwrap();

        assert!(matches!(supervisor.wait_idle(), Ok(EngineState::Rainbow { .. })));
        assert!(supervisor.is_animating());
    }

    #[test]
    fn test_into_writer_stops_animation() {
        init_logger();
        let recording = RecordingWriter::new();
        let mut supervisor = AnimationSupervisor::new(recording.clone(), config(5)).unwrap();
        supervisor.submit(Command::SetRainbow).unwrap();
        wait_for(|| recording.len() >= 2);

        let writer = supervisor.into_writer().expect("writer handed back");
        let written = writer.len();
        thread::sleep(StdDuration::from_millis(20));
        assert_eq!(recording.len(), written);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = EngineConfig::default().with_rainbow(Duration::from_millis(10), 0);
        assert!(matches!(
            AnimationSupervisor::new(RecordingWriter::new(), config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
