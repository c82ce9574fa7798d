use crate::input::{Input, Key};
use crate::simulation::Simulation;

use anyhow::{anyhow, bail, Context};
use std::io::{BufRead, Write};

#[derive(Debug, PartialEq)]
pub enum HostCommand {
    Code(String),
    Keys(Vec<Key>),
    ToggleManual,
    TogglePause,
    Quit,
}

/// Lines starting with `:` are host commands, anything else is an action code.
pub fn parse_line(line: &str) -> anyhow::Result<HostCommand> {
    let line = line.trim();
    let command = match line.strip_prefix(':') {
        Some(command) => command,
        None => return Ok(HostCommand::Code(line.to_owned())),
    };

    let mut words = command.split_whitespace();
    match words.next() {
        Some("manual") => Ok(HostCommand::ToggleManual),
        Some("paralyze") => Ok(HostCommand::TogglePause),
        Some("quit") => Ok(HostCommand::Quit),
        Some("keys") => words.map(parse_key).collect::<anyhow::Result<Vec<Key>>>().map(HostCommand::Keys),
        _ => bail!("Unknown host command {:?}", line),
    }
}

fn parse_key(name: &str) -> anyhow::Result<Key> {
    match name {
        "up" => Ok(Key::Up),
        "down" => Ok(Key::Down),
        "left" => Ok(Key::Left),
        "right" => Ok(Key::Right),
        _ => Err(anyhow!("Unknown key {:?}", name)),
    }
}

/// Runs one tick per input line and writes every agent's pose as a JSON line.
pub fn run_headless<R: BufRead, W: Write>(simulation: &mut Simulation, reader: R, mut writer: W, delta_time: f32) -> anyhow::Result<()> {
    let mut input = Input::new();

    for line in reader.lines() {
        let line = line.context("Failed to read from controller")?;

        let pressed = match parse_line(&line) {
            Ok(HostCommand::Quit) => break,
            Ok(HostCommand::Code(code)) => {
                simulation.queue_code(&code)?;
                Vec::new()
            }
            Ok(HostCommand::Keys(keys)) => keys,
            Ok(HostCommand::ToggleManual) => {
                simulation.toggle_manual()?;
                Vec::new()
            }
            Ok(HostCommand::TogglePause) => {
                simulation.toggle_paralyzed()?;
                Vec::new()
            }
            Err(error) => {
                log::warn!("{:#}", error);
                continue;
            }
        };

        input.update(pressed);
        simulation.step(&input, delta_time)?;

        for pose in simulation.poses()? {
            serde_json::to_writer(&mut writer, &pose)?;
            writeln!(writer)?;
        }
        writer.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_line, run_headless, HostCommand};
    use crate::actions::ActionQueue;
    use crate::controller::AgentController;
    use crate::ecs::EntityComponentSystem;
    use crate::input::Key;
    use crate::physics::FreeMover;
    use crate::simulation::Simulation;
    use crate::transform::Transform;

    #[test]
    fn parses_codes_and_commands() {
        assert_eq!(parse_line("2\n").unwrap(), HostCommand::Code("2".to_owned()));
        assert_eq!(parse_line(":manual").unwrap(), HostCommand::ToggleManual);
        assert_eq!(parse_line(":paralyze").unwrap(), HostCommand::TogglePause);
        assert_eq!(parse_line(":keys up right").unwrap(), HostCommand::Keys(vec![Key::Up, Key::Right]));
        assert_eq!(parse_line(":keys").unwrap(), HostCommand::Keys(Vec::new()));
        assert_eq!(parse_line(":quit").unwrap(), HostCommand::Quit);
        assert!(parse_line(":keys sideways").is_err());
        assert!(parse_line(":jump").is_err());
    }

    #[test]
    fn headless_session_reports_one_pose_per_tick() {
        let mut ecs = EntityComponentSystem::new(2);
        ecs.create_entity(Some(Transform::default()), Some(AgentController::default()), Some(ActionQueue::new())).unwrap();
        let mut simulation = Simulation::new(ecs, Box::new(FreeMover));

        let session = "2\n:bogus\n:manual\n:keys up\n:paralyze\n:keys up\n:quit\n2\n";
        let mut output = Vec::new();
        run_headless(&mut simulation, session.as_bytes(), &mut output, 0.0).unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["position"][2].as_f64(), Some(1.0));
        assert_eq!(lines[1]["manual_override"].as_bool(), Some(true));
        assert_eq!(lines[2]["position"][2].as_f64(), Some(2.0));
        assert_eq!(lines[3]["paralyzed"].as_bool(), Some(true));
        assert_eq!(lines[4]["position"][2].as_f64(), Some(2.0));
        assert_eq!(lines[4]["tick"].as_u64(), Some(5));
    }

    #[test]
    fn repeated_toggles_switch_flags_back_off() {
        let mut ecs = EntityComponentSystem::new(2);
        ecs.create_entity(Some(Transform::default()), Some(AgentController::default()), Some(ActionQueue::new())).unwrap();
        let mut simulation = Simulation::new(ecs, Box::new(FreeMover));

        let session = ":manual\n:manual\n:paralyze\n:paralyze\n2\n";
        let mut output = Vec::new();
        run_headless(&mut simulation, session.as_bytes(), &mut output, 0.0).unwrap();

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0]["manual_override"].as_bool(), Some(true));
        assert_eq!(lines[1]["manual_override"].as_bool(), Some(false));
        assert_eq!(lines[2]["paralyzed"].as_bool(), Some(true));
        assert_eq!(lines[3]["paralyzed"].as_bool(), Some(false));
        assert_eq!(lines[4]["position"][2].as_f64(), Some(1.0));
    }
}
