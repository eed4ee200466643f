use crate::playback::{slider_to_speed, speed_to_slider, PlaybackEngine, SPEED_STEP_MS};
use crate::ui::Tab;

/// Interactive command entered in the visualizer
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    StepForward,
    StepBackward,
    Reset,
    /// 1-based step number as typed by the user
    Seek(usize),
    Faster,
    Slower,
    Speed(u64),
    ShowTab(Tab),
    Help,
    Quit,
}

/// One entry of the command table
#[derive(Clone)]
pub struct Shortcut {
    pub names: &'static [&'static str],
    pub argument: Option<&'static str>,
    pub description: &'static str,
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut { names: &["p", "play"], argument: None, description: "Play" },
    Shortcut { names: &["pause"], argument: None, description: "Pause" },
    Shortcut { names: &["t", "space", "toggle"], argument: None, description: "Play/Pause" },
    Shortcut { names: &["n", "next"], argument: None, description: "Step forward" },
    Shortcut { names: &["b", "back"], argument: None, description: "Step backward" },
    Shortcut { names: &["r", "reset"], argument: None, description: "Back to the first step" },
    Shortcut { names: &["g", "seek"], argument: Some("STEP"), description: "Jump to a step" },
    Shortcut { names: &["+", "faster"], argument: None, description: "Speed up" },
    Shortcut { names: &["-", "slower"], argument: None, description: "Slow down" },
    Shortcut { names: &["speed"], argument: Some("MS"), description: "Delay between steps (100-2000 ms)" },
    Shortcut { names: &["tab"], argument: Some("NAME"), description: "Show another view" },
    Shortcut { names: &["h", "help", "?"], argument: None, description: "Show this help" },
    Shortcut { names: &["q", "quit", "exit"], argument: None, description: "Quit" },
];

pub fn shortcuts() -> &'static [Shortcut] {
    SHORTCUTS
}

/// Parse one input line. An empty line toggles playback.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Toggle);
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };
    let name = name.to_ascii_lowercase();

    let command = match name.as_str() {
        "p" | "play" => Command::Play,
        "pause" => Command::Pause,
        "t" | "space" | "toggle" => Command::Toggle,
        "n" | "next" => Command::StepForward,
        "b" | "back" => Command::StepBackward,
        "r" | "reset" => Command::Reset,
        "+" | "faster" => Command::Faster,
        "-" | "slower" => Command::Slower,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "g" | "seek" => {
            let step = arg
                .parse::<usize>()
                .map_err(|_| format!("expected a step number, got {:?}", arg))?;
            Command::Seek(step)
        }
        "speed" => {
            let ms = arg
                .parse::<u64>()
                .map_err(|_| format!("expected milliseconds, got {:?}", arg))?;
            Command::Speed(ms)
        }
        "tab" => Command::ShowTab(arg.parse()?),
        _ => return Err(format!("unknown command {:?}, type h for help", name)),
    };
    Ok(command)
}

/// Apply a transport command to the engine. Returns false for commands that
/// are not about playback.
pub fn apply_command(engine: &mut PlaybackEngine, command: &Command) -> bool {
    match command {
        Command::Play => {
            engine.play();
        }
        Command::Pause => engine.pause(),
        Command::Toggle => {
            engine.toggle();
        }
        Command::StepForward => engine.step_forward(),
        Command::StepBackward => engine.step_backward(),
        Command::Reset => engine.reset(),
        Command::Seek(step) => engine.seek(step.saturating_sub(1)),
        Command::Faster => {
            let slider = speed_to_slider(engine.state().speed_ms);
            engine.set_speed(slider_to_speed(slider + SPEED_STEP_MS));
        }
        Command::Slower => {
            let slider = speed_to_slider(engine.state().speed_ms);
            engine.set_speed(slider_to_speed(slider.saturating_sub(SPEED_STEP_MS)));
        }
        Command::Speed(ms) => {
            engine.set_speed(*ms);
        }
        Command::ShowTab(_) | Command::Help | Command::Quit => return false,
    }
    true
}

pub fn help_text() -> String {
    let mut lines = vec!["Commands:".to_string()];
    for shortcut in shortcuts() {
        let mut usage = shortcut.names.join(", ");
        if let Some(arg) = shortcut.argument {
            usage.push(' ');
            usage.push_str(arg);
        }
        lines.push(format!("  {:<24} {}", usage, shortcut.description));
    }
    let tabs: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
    lines.push(format!("Tabs: {}", tabs.join(", ")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HighlightEvent;

    #[test]
    fn test_parse_transport_commands() {
        assert_eq!(parse_command("p"), Ok(Command::Play));
        assert_eq!(parse_command("  NEXT "), Ok(Command::StepForward));
        assert_eq!(parse_command(""), Ok(Command::Toggle));
        assert_eq!(parse_command("b"), Ok(Command::StepBackward));
        assert_eq!(parse_command("+"), Ok(Command::Faster));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_command("g 4"), Ok(Command::Seek(4)));
        assert_eq!(parse_command("speed 250"), Ok(Command::Speed(250)));
        assert_eq!(parse_command("tab state table"), Ok(Command::ShowTab(Tab::StateTable)));
        assert!(parse_command("g").is_err());
        assert!(parse_command("speed fast").is_err());
        assert!(parse_command("tab nowhere").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_transport_commands() {
        let mut engine = PlaybackEngine::new(1000);
        engine.load((0..5).map(|i| HighlightEvent::new(format!("n{}", i))).collect());

        assert!(apply_command(&mut engine, &Command::Seek(4)));
        assert_eq!(engine.state().current_index, 3);
        apply_command(&mut engine, &Command::Seek(0));
        assert_eq!(engine.state().current_index, 0);

        apply_command(&mut engine, &Command::Faster);
        assert_eq!(engine.state().speed_ms, 900);
        apply_command(&mut engine, &Command::Speed(50));
        apply_command(&mut engine, &Command::Faster);
        assert_eq!(engine.state().speed_ms, 100);
        apply_command(&mut engine, &Command::Speed(2000));
        apply_command(&mut engine, &Command::Slower);
        assert_eq!(engine.state().speed_ms, 2000);

        apply_command(&mut engine, &Command::Toggle);
        assert!(engine.is_playing());
        apply_command(&mut engine, &Command::Reset);
        assert!(!engine.is_playing());

        assert!(!apply_command(&mut engine, &Command::Help));
    }

    #[test]
    fn test_every_shortcut_parses() {
        for shortcut in shortcuts() {
            for name in shortcut.names {
                let line = match shortcut.argument {
                    Some("NAME") => format!("{} logic", name),
                    Some(_) => format!("{} 3", name),
                    None => name.to_string(),
                };
                assert!(parse_command(&line).is_ok(), "{} did not parse", line);
            }
        }
        assert!(help_text().contains("Narration"));
    }
}
