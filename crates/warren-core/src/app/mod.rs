//! App - アプリケーション層
//!
//! domain / handler / ports を組み合わせて監視ループを実装します。
//!
//! # 主要コンポーネント
//! - **SupervisorBuilder**: 依存の組み立てと起動前検証
//! - **Supervisor**: Starting → Monitoring → Closing の状態機械
//! - **WorkerPlan**: 設定から起動する Worker の一覧を導出
//! - **WorkerHandle / WorkerRegistry**: キューごとの Worker タスクとその台帳
//! - **Notification**: Closing 時の通知内容

pub mod builder;
pub mod notification;
pub mod plan;
pub mod registry;
pub mod status;
pub mod supervisor;
pub mod worker;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, SupervisorBuilder};
pub use self::notification::Notification;
pub use self::plan::{PlannedWorker, WorkerPlan};
pub use self::registry::WorkerRegistry;
pub use self::status::{SupervisorState, SupervisorStatus, WorkerStatus};
pub use self::supervisor::{Closed, Supervisor, Tick};
pub use self::worker::{WorkerHandle, WorkerSpec};
