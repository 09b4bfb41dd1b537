//! メッセージ送信（通知）の実装
//!
//! `MessagePusher` trait の具体的な実装を提供します。
//!
//! - `channel`: 接続ごとの bounded キュー（writer タスクが TCP へ書き出す）

pub mod channel;

pub use channel::ChannelMessagePusher;
