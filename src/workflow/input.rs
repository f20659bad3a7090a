use std::fmt::Display;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::services::{Console, SpeechRecognizer, Transcription};

/// Shows numbered options and returns the one picked. Re-prompts until the
/// answer is a number within range.
pub fn choose<'a, T: Display>(
    console: &mut dyn Console,
    prompt: &str,
    options: &'a [T],
) -> AppResult<&'a T> {
    console.say(prompt);
    for (index, option) in options.iter().enumerate() {
        console.say(&format!("{}. {option}", index + 1));
    }

    loop {
        let answer = console.ask("Enter the number of your choice: ")?;
        match answer.trim().parse::<usize>() {
            Ok(choice) if (1..=options.len()).contains(&choice) => return Ok(&options[choice - 1]),
            Ok(_) => console.say("Invalid choice. Please try again."),
            Err(_) => console.say("Please enter a valid number."),
        }
    }
}

/// Asks the user to accept `candidate` or type a replacement.
pub fn confirm(console: &mut dyn Console, candidate: String) -> AppResult<String> {
    console.say(&candidate);
    loop {
        let answer = console.ask("Is this correct? (Y/N): ")?;
        match answer.trim().to_lowercase().as_str() {
            "y" => return Ok(candidate),
            "n" => return console.ask("Please edit the text as required: "),
            _ => console.say("Please enter Y or N."),
        }
    }
}

/// Captures free text by voice, retrying on unintelligible audio and falling
/// back to typed input when speech recognition is unavailable.
pub async fn capture_text(
    console: &mut dyn Console,
    recognizer: &dyn SpeechRecognizer,
    prompt: &str,
) -> AppResult<String> {
    loop {
        let heard = match recognizer.adjust_for_ambient_noise().await {
            Ok(()) => {
                console.say(prompt);
                recognizer.listen().await
            }
            Err(err) => Err(err),
        };

        match heard {
            Ok(Transcription::Text(text)) => {
                debug!(chars = text.len(), "speech transcribed");
                return confirm(console, text.to_lowercase());
            }
            Ok(Transcription::Unintelligible) => {
                console.say("Could not understand. Please try again.");
            }
            Err(err) => {
                warn!(error = %err, "falling back to typed input");
                console.say("Speech recognition service unavailable. Please type manually.");
                return console.ask(&format!("{prompt} (Manual Input): "));
            }
        }
    }
}
