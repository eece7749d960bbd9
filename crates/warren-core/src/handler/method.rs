//! Method - capability が公開する呼び出し単位
//!
//! # 二層構造
//! - **表層（Typed）**: `Method` trait - Args / Output を型で宣言する
//! - **内部（Dyn）**: `DynMethod` trait - object-safe, `Vec<Value>` を受け取る
//!
//! `TypedMethod<M>` が両者をつなぐ（type erasure）。

use std::future::Future;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::HandlerError;

/// Method は型付きの引数を受け取って結果を返す
///
/// # 使用例
/// ```ignore
/// struct Consume;
///
/// #[async_trait]
/// impl Method for Consume {
///     type Args = (String, u32);
///     type Output = ();
///
///     async fn call(&self, (queue, prefetch): Self::Args) -> Result<(), HandlerError> {
///         // blocking consume loop ...
///         Ok(())
///     }
/// }
/// ```
///
/// 引数列は JSON 配列として `Args` に decode される（タプルは位置引数になる）。
/// 引数なしの method は `Args = ()` にする。
#[async_trait]
pub trait Method: Send + Sync {
    type Args: DeserializeOwned + Send;
    type Output: Serialize + Send;

    async fn call(&self, args: Self::Args) -> Result<Self::Output, HandlerError>;
}

/// DynMethod は object-safe な Method
///
/// Capability は `HashMap<String, Arc<dyn DynMethod>>` で method を保持する。
#[async_trait]
pub trait DynMethod: Send + Sync {
    async fn call_dyn(&self, args: Vec<Value>) -> Result<Value, HandlerError>;
}

pub struct TypedMethod<M> {
    method: M,
}

impl<M: Method> TypedMethod<M> {
    pub fn new(method: M) -> Self {
        Self { method }
    }
}

#[async_trait]
impl<M: Method> DynMethod for TypedMethod<M> {
    async fn call_dyn(&self, args: Vec<Value>) -> Result<Value, HandlerError> {
        let args: M::Args = decode_args(args)?;
        let output = self.method.call(args).await?;
        serde_json::to_value(output).map_err(|e| HandlerError::failed(format!("json encode: {e}")))
    }
}

/// クロージャをそのまま method として登録するためのラッパー
pub struct FnMethod<F> {
    f: F,
}

impl<F> FnMethod<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut,
        Fut: Future<Output = Result<Value, HandlerError>>,
    {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> DynMethod for FnMethod<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn call_dyn(&self, args: Vec<Value>) -> Result<Value, HandlerError> {
        (self.f)(args).await
    }
}

/// 引数列を `A` に decode する
///
/// 空の引数列は、まず null として試す（`()` や `Option<T>` 用）。
fn decode_args<A: DeserializeOwned>(args: Vec<Value>) -> Result<A, HandlerError> {
    if args.is_empty()
        && let Ok(decoded) = serde_json::from_value(Value::Null)
    {
        return Ok(decoded);
    }

    serde_json::from_value(Value::Array(args))
        .map_err(|e| HandlerError::InvalidArguments(e.to_string()))
}
