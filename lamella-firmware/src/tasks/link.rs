//! Link UART tasks
//!
//! The network bridge speaks `<topic> <payload>\n` lines over UART0.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embedded_io_async::{Read, Write};

use lamella_protocol::{LineAssembler, Message, Topic};

use crate::channels::{INBOUND, OUTBOUND, OUTBOUND_LINE_SIZE};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - assembles lines and hands them to the command task
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut assembler = LineAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    match assembler.feed(byte) {
                        Ok(Some(line)) => {
                            if INBOUND.try_send(line).is_err() {
                                warn!("Inbound queue full, dropping line");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Dropped link line: {:?}", e),
                    }
                }
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
                assembler.reset();
            }
        }
    }
}

/// Link TX task - writes queued lines
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    loop {
        let line = OUTBOUND.receive().await;
        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("UART write error: {:?}", e);
        }
    }
}

/// Encode and queue one outbound message
pub fn queue_line(topic: Topic, payload: &str) {
    match Message::new(topic, payload).encode::<OUTBOUND_LINE_SIZE>() {
        Ok(line) => {
            if OUTBOUND.try_send(line).is_err() {
                warn!("Outbound queue full, dropping {}", topic.as_str());
            }
        }
        Err(e) => warn!("Cannot encode {}: {:?}", topic.as_str(), e),
    }
}
