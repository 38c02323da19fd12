//! Driver commands parsed from interactive input.

use floorbot_core::OrderClass;

/// One line of driver input, already parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    /// Submit an order of the given class.
    NewOrder(OrderClass),
    /// Add one bot to the pool.
    AddBot,
    /// Remove the highest-id bot.
    RemoveBot,
    /// Print the command menu.
    Help,
    /// Shut the floor down and leave.
    Exit,
}

impl DriverCommand {
    /// Menu text shown at startup and after unrecognized input.
    pub fn usage() -> &'static str {
        "commands: 1 | new normal, 2 | new vip, 3 | add bot, 4 | remove bot, h | help, 5 | exit"
    }
}

impl std::str::FromStr for DriverCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Word and digit forms are both accepted, case-insensitively.
        match s.trim().to_lowercase().as_str() {
            "1" | "new normal" | "new normal order" | "normal" => {
                Ok(DriverCommand::NewOrder(OrderClass::Normal))
            }
            "2" | "new vip" | "new vip order" | "vip" => {
                Ok(DriverCommand::NewOrder(OrderClass::Vip))
            }
            "3" | "add bot" | "+ bot" | "new bot" => Ok(DriverCommand::AddBot),
            "4" | "remove bot" | "- bot" => Ok(DriverCommand::RemoveBot),
            "h" | "help" | "?" => Ok(DriverCommand::Help),
            "5" | "exit" | "quit" | "q" => Ok(DriverCommand::Exit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}
