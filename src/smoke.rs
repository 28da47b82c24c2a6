// Smoke client: the four calls a human runs against a fresh server to see
// that it answers, each one printing what came back. `run_script` is the
// fixed sequence the binary runs when started without a subcommand.

use crate::api::{ApiClient, ApiResponse};
use crate::models::{BookQuery, LoginRequest, NewBook, RegisterRequest};
use anyhow::Result;
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use log::{debug, warn};
use std::io::{self, Stdout, Write};

pub const TEST_EMAIL: &str = "test1@example.com";
pub const TEST_PASSWORD: &str = "password123";
pub const TEST_NAME: &str = "Test User";
pub const TEST_BOOK_TITLE: &str = "New Book12";
pub const TEST_BOOK_AUTHOR: &str = "Author Name11";
pub const TEST_BOOK_YEAR: i32 = 202211;

/// Print `"<label>: <body> [<status>]"`. With `color` set the status is
/// green for 2xx and red otherwise; without it the line is plain text.
pub fn write_response<W: Write>(out: &mut W, label: &str, res: &ApiResponse, color: bool) -> Result<()> {
    let status = res.status.to_string();
    if color {
        let status = if res.is_success() { status.green() } else { status.red() };
        writeln!(out, "{}: {} [{}]", label, res.body, status)?;
    } else {
        writeln!(out, "{}: {} [{}]", label, res.body, status)?;
    }
    Ok(())
}

/// Which optional steps `run_script` performs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptOptions {
    /// Register the test user before logging in.
    pub register: bool,
}

/// Everything the script saw, in call order.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub registered: Option<ApiResponse>,
    pub token: Option<String>,
    pub books: ApiResponse,
    pub added: ApiResponse,
}

pub struct SmokeClient<W: Write> {
    api: ApiClient,
    out: W,
    color: bool,
}

impl SmokeClient<Stdout> {
    /// Print to stdout, colored only when stdout is a terminal.
    pub fn stdout(api: ApiClient) -> Self {
        let out = io::stdout();
        let color = out.is_tty();
        SmokeClient::new(api, out).with_color(color)
    }
}

impl<W: Write> SmokeClient<W> {
    /// Plain-text output into `out`.
    pub fn new(api: ApiClient, out: W) -> Self {
        SmokeClient { api, out, color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Hand back the output sink, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn register(&mut self, email: &str, password: &str, name: &str) -> Result<ApiResponse> {
        let req = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let res = self.api.register(&req)?;
        write_response(&mut self.out, "Register User", &res, self.color)?;
        Ok(res)
    }

    /// Log in and return the bearer token, or `None` when the server gave
    /// none (bad credentials, unexpected body).
    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<String>> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let res = self.api.login(&req)?;
        write_response(&mut self.out, "Login User", &res, self.color)?;
        let token = res.token();
        if token.is_none() {
            warn!("login for {} returned no token ({})", email, res.status);
        }
        Ok(token)
    }

    /// Public listing, sent without credentials.
    pub fn list_books(&mut self) -> Result<ApiResponse> {
        let res = self.api.list_books(&BookQuery::default(), None)?;
        write_response(&mut self.out, "Get Books", &res, self.color)?;
        Ok(res)
    }

    /// Add a book with the fixed ISBN, quantity and timestamps. The book
    /// payload carries no year, so `year` only shows up in the debug log.
    pub fn add_book(&mut self, token: Option<&str>, title: &str, author: &str, year: i32) -> Result<ApiResponse> {
        debug!("adding {:?} by {:?} (year {} not sent)", title, author, year);
        let res = self.api.add_book(&NewBook::fixture(title, author), token)?;
        write_response(&mut self.out, "Add Book", &res, self.color)?;
        Ok(res)
    }

    /// Login, list, add; optionally register first. Stops at the first
    /// transport error.
    pub fn run_script(&mut self, opts: ScriptOptions) -> Result<ScriptOutcome> {
        let registered = if opts.register {
            Some(self.register(TEST_EMAIL, TEST_PASSWORD, TEST_NAME)?)
        } else {
            None
        };
        let token = self.login(TEST_EMAIL, TEST_PASSWORD)?;
        let books = self.list_books()?;
        let added = self.add_book(token.as_deref(), TEST_BOOK_TITLE, TEST_BOOK_AUTHOR, TEST_BOOK_YEAR)?;
        Ok(ScriptOutcome {
            registered,
            token,
            books,
            added,
        })
    }
}
