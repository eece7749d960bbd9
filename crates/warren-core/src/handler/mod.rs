//! Handler - 設定ファイルの識別子からユーザーロジックを呼び出す
//!
//! 文字列の `handler_class` / `method` を、起動時に組み立てた
//! capability テーブルで解決する（リフレクションは使わない）。
//!
//! - **Method / DynMethod**: 型付き method と object-safe な method
//! - **Capability**: 名前付きの method の集まり
//! - **HandlerRegistry**: handler 名 → Capability（singleton / factory）
//! - **HandlerInvoker**: 解決して呼び出し、失敗を InvocationFailure にまとめる

pub mod capability;
pub mod invoker;
pub mod method;
pub mod registry;

pub use self::capability::Capability;
pub use self::invoker::HandlerInvoker;
pub use self::method::{DynMethod, FnMethod, Method, TypedMethod};
pub use self::registry::{HandlerRegistry, RegistryError};
