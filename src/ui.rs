// UI layer: an interactive menu over the library API using `dialoguer`.
// Each entry collects its inputs, calls `ApiClient` behind a spinner and
// prints the response with the same labelled printer the smoke script uses.

use crate::api::{ApiClient, ApiResponse};
use crate::models::{BookQuery, LoginRequest, NewBook, RegisterRequest, TokenClaims, FIXTURE_TIMESTAMP};
use crate::smoke::write_response;
use anyhow::Result;
use crossterm::tty::IsTty;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

const TOKEN_FILE: &str = ".library_smoke_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Register,
    Login,
    ListBooks,
    SearchBooks,
    ShowBook,
    AddBook,
    UpdateBook,
    DeleteBook,
    BorrowBook,
    ReturnBook,
    BorrowHistory,
    BorrowedReport,
    PopularReport,
    Logout,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 15] = [
        MenuItem::Register,
        MenuItem::Login,
        MenuItem::ListBooks,
        MenuItem::SearchBooks,
        MenuItem::ShowBook,
        MenuItem::AddBook,
        MenuItem::UpdateBook,
        MenuItem::DeleteBook,
        MenuItem::BorrowBook,
        MenuItem::ReturnBook,
        MenuItem::BorrowHistory,
        MenuItem::BorrowedReport,
        MenuItem::PopularReport,
        MenuItem::Logout,
        MenuItem::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::Register => "Register",
            MenuItem::Login => "Login",
            MenuItem::ListBooks => "List books",
            MenuItem::SearchBooks => "Search books",
            MenuItem::ShowBook => "Show book",
            MenuItem::AddBook => "Add book",
            MenuItem::UpdateBook => "Update book",
            MenuItem::DeleteBook => "Delete book",
            MenuItem::BorrowBook => "Borrow book",
            MenuItem::ReturnBook => "Return book",
            MenuItem::BorrowHistory => "Borrow history",
            MenuItem::BorrowedReport => "Report: borrowed books",
            MenuItem::PopularReport => "Report: popular books",
            MenuItem::Logout => "Logout",
            MenuItem::Exit => "Exit",
        }
    }
}

/// Main interactive menu. Runs a select loop until the user chooses
/// "Exit". A token saved by an earlier session is picked up on start.
pub fn main_menu(api: ApiClient) -> Result<()> {
    let token_path = token_path();
    let mut token = match load_token(&token_path) {
        Ok(token) => token,
        Err(e) => {
            debug!("saved token unreadable: {:#}", e);
            None
        }
    };
    if let Some(t) = &token {
        greet(t);
    }

    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();
    loop {
        let selection = Select::new().items(&labels).default(0).interact()?;
        let t = token.as_deref();
        let outcome = match MenuItem::ALL[selection] {
            MenuItem::Register => {
                let req = prompt_register()?;
                call("Register User", || api.register(&req))
            }
            MenuItem::Login => {
                let req = prompt_login()?;
                match login(&api, &req) {
                    Ok(Some(new_token)) => {
                        greet(&new_token);
                        let saved = persist_token(&token_path, &new_token);
                        token = Some(new_token);
                        saved
                    }
                    Ok(None) => Ok(()),
                    Err(e) => Err(e),
                }
            }
            MenuItem::ListBooks => call("Get Books", || api.list_books(&BookQuery::default(), t)),
            MenuItem::SearchBooks => {
                let query = prompt_query()?;
                call("Search Books", || api.list_books(&query, t))
            }
            MenuItem::ShowBook => {
                let id = prompt_id("Book id")?;
                call("Get Book", || api.get_book(id, t))
            }
            MenuItem::AddBook => {
                let book = prompt_book()?;
                call("Add Book", || api.add_book(&book, t))
            }
            MenuItem::UpdateBook => {
                let id = prompt_id("Book id")?;
                let book = prompt_book()?;
                call("Update Book", || api.update_book(id, &book, t))
            }
            MenuItem::DeleteBook => {
                let id = prompt_id("Book id")?;
                if Confirm::new().with_prompt(format!("Delete book {}?", id)).interact()? {
                    call("Delete Book", || api.delete_book(id, t))
                } else {
                    Ok(())
                }
            }
            MenuItem::BorrowBook => {
                let id = prompt_id("Book id")?;
                call("Borrow Book", || api.borrow_book(id, t))
            }
            MenuItem::ReturnBook => {
                let id = prompt_id("Borrow id")?;
                call("Return Book", || api.return_book(id, t))
            }
            MenuItem::BorrowHistory => call("Borrow History", || api.borrow_history(t)),
            MenuItem::BorrowedReport => call("Borrowed Books", || api.borrowed_report(t)),
            MenuItem::PopularReport => call("Popular Books", || api.popular_report(t)),
            MenuItem::Logout => {
                token = None;
                forget_token(&token_path)?;
                println!("Logged out.");
                Ok(())
            }
            MenuItem::Exit => break,
        };
        // Prompt errors return above; only request failures get here.
        if let Err(e) = outcome {
            println!("Request failed: {:#}", e);
        }
    }
    Ok(())
}

/// Run one API call behind a spinner and print its response.
fn call<F>(label: &str, f: F) -> Result<()>
where
    F: FnOnce() -> Result<ApiResponse>,
{
    let spinner = spinner(label);
    let res = f();
    spinner.finish_and_clear();
    print_response(label, &res?)
}

fn print_response(label: &str, res: &ApiResponse) -> Result<()> {
    let mut out = io::stdout();
    let color = out.is_tty();
    write_response(&mut out, label, res, color)
}

fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{}...", msg));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn prompt_register() -> Result<RegisterRequest> {
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    // `Password` hides input in terminal for passwords.
    let password: String = Password::new().with_prompt("Password").interact()?;
    Ok(RegisterRequest { email, password, name })
}

fn prompt_login() -> Result<LoginRequest> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password: String = Password::new().with_prompt("Password").interact()?;
    Ok(LoginRequest { email, password })
}

/// Log in, returning the token if the server sent one.
fn login(api: &ApiClient, req: &LoginRequest) -> Result<Option<String>> {
    let spinner = spinner("Logging in");
    let res = api.login(req);
    spinner.finish_and_clear();
    let res = res?;
    print_response("Login User", &res)?;
    Ok(res.token())
}

fn greet(token: &str) {
    match TokenClaims::decode(token) {
        Ok(claims) if claims.is_admin => println!("Welcome {} (admin)!", claims.email),
        Ok(claims) => println!("Welcome {}!", claims.email),
        Err(e) => debug!("token claims unreadable: {:#}", e),
    }
}

fn prompt_id(prompt: &str) -> Result<i64> {
    Ok(Input::new().with_prompt(prompt).interact_text()?)
}

fn prompt_query() -> Result<BookQuery> {
    let title: String = Input::new().with_prompt("Title contains").allow_empty(true).interact_text()?;
    let author: String = Input::new().with_prompt("Author contains").allow_empty(true).interact_text()?;
    let available = Confirm::new().with_prompt("Only available books?").default(false).interact()?;
    Ok(BookQuery {
        title: Some(title).filter(|s| !s.is_empty()),
        author: Some(author).filter(|s| !s.is_empty()),
        available: available.then_some(true),
    })
}

fn prompt_book() -> Result<NewBook> {
    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let author: String = Input::new().with_prompt("Author").interact_text()?;
    let isbn: String = Input::new().with_prompt("ISBN").interact_text()?;
    let published_year: i64 = Input::new().with_prompt("Published year").interact_text()?;
    let quantity: i64 = Input::new().with_prompt("Quantity").default(1).interact_text()?;
    Ok(NewBook {
        title,
        author,
        isbn,
        quantity,
        created_at: FIXTURE_TIMESTAMP.to_string(),
        updated_at: FIXTURE_TIMESTAMP.to_string(),
        published_year: Some(published_year),
    })
}

/// Token file in the user's home directory, or the working directory when
/// there is no home.
pub fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

pub fn persist_token(path: &Path, token: &str) -> Result<()> {
    std::fs::write(path, token)?;
    Ok(())
}

/// Read a saved token. A missing or blank file is no token; any other
/// read failure is an error.
pub fn load_token(path: &Path) -> Result<Option<String>> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(anyhow::Error::new(e).context(format!("reading {}", path.display()))),
    };
    let token = data.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

pub fn forget_token(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
