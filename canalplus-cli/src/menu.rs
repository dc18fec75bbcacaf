use std::io::{self, BufRead, IsTerminal, Write};

use inquire::{CustomType, InquireError, validator::Validation};

use crate::error::{AppError, Result};

/// Capitalize every word and collapse runs of whitespace.
pub fn capwords(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Numbered menu lines, starting at 1.
pub fn menu_lines<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    titles
        .into_iter()
        .enumerate()
        .map(|(i, title)| format!("{:>3}. {title}", i + 1))
        .collect()
}

pub fn print_menu<'a>(titles: impl IntoIterator<Item = &'a str>) {
    for line in menu_lines(titles) {
        println!("{line}");
    }
}

/// Ask for a 1-based menu entry until a valid one is typed; returns its
/// 0-based index.
pub async fn choose(count: usize) -> Result<usize> {
    tokio::task::spawn_blocking(move || prompt_index(count))
        .await
        .map_err(|e| AppError::Prompt(e.to_string()))?
}

fn prompt_index(count: usize) -> Result<usize> {
    if !io::stdin().is_terminal() {
        return read_index(io::stdin().lock(), io::stdout(), count);
    }

    CustomType::<usize>::new("?")
        .with_error_message("Please type a number")
        .with_validator(move |choice: &usize| {
            if (1..=count).contains(choice) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    format!("Please type a number between 1 and {count}").into(),
                ))
            }
        })
        .prompt()
        .map(|choice| choice - 1)
        .or_else(|e| match e {
            InquireError::NotTTY => read_index(io::stdin().lock(), io::stdout(), count),
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                Err(AppError::Interrupted)
            }
            other => Err(AppError::Prompt(other.to_string())),
        })
}

/// Line-based prompt for piped input. End of input counts as an interrupt.
fn read_index<R, W>(mut input: R, mut output: W, count: usize) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "? ")
            .and_then(|()| output.flush())
            .map_err(|e| AppError::Prompt(e.to_string()))?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| AppError::Prompt(e.to_string()))?;
        if read == 0 {
            return Err(AppError::Interrupted);
        }

        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=count).contains(&choice) => return Ok(choice - 1),
            Ok(_) => eprintln!("Please type a number between 1 and {count}"),
            Err(_) => eprintln!("Please type a number"),
        }
    }
}
