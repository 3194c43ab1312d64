//! mpsc チャンネルを使った FrameSink / FrameSource 実装
//!
//! ネットワークを介さずに Presence Lifecycle や Broadcaster を動かすための
//! プロセス内トランスポート。送信側を閉じると受信側のチャンネルも閉じます。

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{FrameSink, FrameSource, TransportError};

/// チャンネルへ書き込む FrameSink
pub struct ChannelFrameSink {
    sender: Option<mpsc::UnboundedSender<String>>,
}

impl ChannelFrameSink {
    /// 新しい ChannelFrameSink と、書き込まれたフレームを受け取る Receiver を作成
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelFrameSink {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        match &self.sender {
            Some(sender) => sender.send(payload).map_err(|_| TransportError::Closed),
            None => Err(TransportError::Closed),
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sender.take();
        Ok(())
    }
}

/// チャンネルから読み出す FrameSource
///
/// 送信側がすべて drop されると、ピアが切断したものとして `None` を返します。
pub struct ChannelFrameSource {
    receiver: mpsc::UnboundedReceiver<Result<String, TransportError>>,
}

impl ChannelFrameSource {
    /// 新しい ChannelFrameSource と、フレームを送り込む Sender を作成
    pub fn new() -> (mpsc::UnboundedSender<Result<String, TransportError>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { receiver: rx })
    }
}

#[async_trait]
impl FrameSource for ChannelFrameSource {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        self.receiver.recv().await
    }
}
