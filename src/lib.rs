// Library root
// -----------
// A smoke-test client for the library-management HTTP API. The binary
// (`main.rs`) either runs the fixed smoke script or starts the menu.
//
// Module responsibilities:
// - `api`: blocking HTTP calls to every server endpoint, with best-effort
//   JSON decoding of whatever comes back.
// - `models`: request payloads and the login token's claims.
// - `smoke`: labelled printing of responses and the fixed script
//   (login, list books, add book).
// - `ui`: the interactive menu and token persistence helpers.
pub mod api;
pub mod models;
pub mod smoke;
pub mod ui;
