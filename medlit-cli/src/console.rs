//! Interactive search prompt.
//!
//! Asks for the search form fields in order: query, optional
//! publication year, journal and keywords, and a result count.

use anyhow::Result;
use medlit_rag::MedicalSearch;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

enum Input {
    Line(String),
    Quit,
}

fn read(editor: &mut DefaultEditor, prompt: &str) -> Result<Input> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Input::Line(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(Input::Quit),
        Err(e) => Err(e.into()),
    }
}

/// Parse the result-count field. Blank means "use the default".
fn parse_limit(raw: &str) -> std::result::Result<Option<usize>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<usize>().map(Some).map_err(|_| format!("'{raw}' is not a number"))
}

pub async fn run(search: &MedicalSearch) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let default_limit = search.config().default_result_limit;
    println!("Medical Literature Search. Empty query or Ctrl-D to exit.\n");

    loop {
        let Input::Line(query) = read(&mut editor, "Search Query> ")? else { break };
        if query.is_empty() || query == "exit" || query == "quit" {
            break;
        }
        let _ = editor.add_history_entry(query.as_str());

        let Input::Line(year) = read(&mut editor, "Publication Year (optional)> ")? else { break };
        let Input::Line(journal) = read(&mut editor, "Journal (optional)> ")? else { break };
        let Input::Line(keywords) = read(&mut editor, "Keywords (optional)> ")? else { break };
        let Input::Line(count) =
            read(&mut editor, &format!("Number of Results [{default_limit}]> "))?
        else {
            break;
        };

        let limit = match parse_limit(&count) {
            Ok(limit) => limit,
            Err(message) => {
                eprintln!("{message}\n");
                continue;
            }
        };

        match search.search_form(&query, &year, &journal, &keywords, limit).await {
            Ok((report, stats)) => println!("\n{report}{stats}\n"),
            Err(e) => {
                error!(error = %e, "search failed");
                eprintln!("Search failed: {e}\n");
            }
        }
    }
    Ok(())
}
