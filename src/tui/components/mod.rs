//! # TUI Components
//!
//! All UI components for the terminal viewer.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: Top status bar showing source and status
//! - `MessageBubble`: A single message, aligned by role
//! - `LoadingView` / `ErrorView`: Main-area placeholders
//! - `JumpButton`: Floating "jump to latest" control
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `MessageList`: Scrollable thread view with layout caching. Its persistent
//!   half (`MessageListState`) lives in `TuiState` and handles scroll events.
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as "props" (struct fields), not by
//! reaching into `ViewState` themselves. This keeps them testable with a
//! `TestBackend` and a hand-built thread.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status bar)
//! ├── message.rs       (Single message bubble)
//! ├── message_list.rs  (Scrollable grouped thread)
//! ├── jump_button.rs   (Jump-to-latest button)
//! └── status.rs        (Loading and error views)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod jump_button;
pub mod message;
pub mod message_list;
pub mod status;
pub use jump_button::JumpButton;
pub use message::MessageBubble;
pub use message_list::{MessageList, MessageListState};
pub use status::{ErrorView, LoadingView};
