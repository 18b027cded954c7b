//! Reminder slash commands: /remind, /reminders, /forget

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates reminder commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_remind_command(),
        create_reminders_command(),
        create_forget_command(),
    ]
}

/// Creates the remind command
fn create_remind_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("remind")
        .description("Set a reminder")
        .create_option(|option| {
            option
                .name("reminder")
                .description("When and what, e.g. `3 days to walk the dog` or `10 minutes`")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the reminders command
fn create_reminders_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("reminders")
        .description("List or clear your pending reminders")
        .create_option(|option| {
            option
                .name("action")
                .description("What to do with your reminders")
                .kind(CommandOptionType::String)
                .required(false)
                .add_string_choice("list", "list")
                .add_string_choice("clear", "clear")
        })
        .to_owned()
}

/// Creates the forget command
fn create_forget_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("forget")
        .description("Cancel one reminder by its tag")
        .create_option(|option| {
            option
                .name("tag")
                .description("The reminder tag shown by /reminders")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}
