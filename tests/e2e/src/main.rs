fn main() {
    println!("Run `cargo test -p transfer-e2e` to execute end-to-end transfer tests.");
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::Arc;

    use depot_client::DepotClient;
    use depot_protocol::constants::MAX_FRAME_LEN;
    use depot_protocol::{Command, Response};
    use depot_server::{DepotServer, ServerConfig, samples};
    use depot_wire::{read_message, write_frame, write_message};
    use tokio::io::{AsyncWriteExt, BufReader, BufWriter};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    struct TestServer {
        server: Arc<DepotServer>,
        addr: SocketAddr,
        handle: JoinHandle<Result<(), depot_server::ServerError>>,
    }

    impl TestServer {
        /// Binds a server on a dynamic port over the given root.
        async fn start(root: &Path) -> Self {
            Self::start_with_chunk_size(root, 1024 * 1024).await
        }

        async fn start_with_chunk_size(root: &Path, chunk_size: u64) -> Self {
            let config = ServerConfig {
                port: 0,
                root: root.to_path_buf(),
                chunk_size,
                ..ServerConfig::default()
            };
            let server = Arc::new(DepotServer::bind(config).await.unwrap());
            let addr = server.local_addr().unwrap();
            let runner = Arc::clone(&server);
            let handle = tokio::spawn(async move { runner.run().await });
            Self {
                server,
                addr,
                handle,
            }
        }

        async fn stop(self) {
            self.server.shutdown();
            self.handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn listing_is_sorted_with_sizes() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("zeta.bin"), vec![0u8; 2_000_000]).unwrap();
        std::fs::write(root.path().join("alpha.txt"), b"hi").unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let files = client.list_files().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "alpha.txt");
        assert_eq!(files[0].size, 2);
        assert_eq!(files[1].name, "zeta.bin");
        assert_eq!(files[1].size, 2_000_000);
        assert_eq!(files[1].size_mb, 1.91);

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn single_download_is_byte_exact() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..100_000u32).flat_map(|n| n.to_le_bytes()).collect();
        std::fs::write(root.path().join("data.bin"), &data).unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let outcome = client
            .download("data.bin", out.path(), |_| {})
            .await
            .unwrap();
        assert!(outcome.is_ok());
        assert_eq!(outcome.bytes, data.len() as u64);
        assert_eq!(std::fs::read(out.path().join("data.bin")).unwrap(), data);

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn multi_chunk_download_exercises_chunking() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();

        // Larger than two full 1 MiB chunks.
        let data: Vec<u8> = (0..2_500_000usize).map(|i| (i % 251) as u8).collect();
        std::fs::write(root.path().join("big.bin"), &data).unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let mut chunks_seen = Vec::new();
        let outcome = client
            .download("big.bin", out.path(), |p| {
                chunks_seen.push((p.chunk_number, p.total_chunks));
            })
            .await
            .unwrap();
        assert!(outcome.is_ok());
        assert_eq!(chunks_seen, [(1, 3), (2, 3), (3, 3)]);
        assert_eq!(std::fs::read(out.path().join("big.bin")).unwrap(), data);

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn empty_file_downloads_as_one_empty_chunk() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("empty.txt"), b"").unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let mut percents = Vec::new();
        let outcome = client
            .download("empty.txt", out.path(), |p| {
                percents.push(p.percent());
            })
            .await
            .unwrap();
        assert!(outcome.is_ok());
        assert_eq!(outcome.bytes, 0);
        assert_eq!(percents, [100.0]);
        assert_eq!(std::fs::read(out.path().join("empty.txt")).unwrap(), b"");

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn batch_with_missing_file_continues_and_reports() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("a.txt"), b"first").unwrap();
        std::fs::write(root.path().join("c.txt"), b"third").unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let names: Vec<String> = ["a.txt", "missing.txt", "c.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = client
            .download_all(&names, out.path(), |_, _| {})
            .await
            .unwrap();

        assert!(!report.all_ok());
        assert_eq!(report.files.len(), 3);
        assert!(report.files[0].is_ok());
        assert!(!report.files[1].is_ok());
        assert!(
            report.files[1].error.as_deref().unwrap().contains("not found"),
            "got: {:?}",
            report.files[1].error
        );
        assert!(report.files[2].is_ok());

        assert_eq!(std::fs::read(out.path().join("a.txt")).unwrap(), b"first");
        assert_eq!(std::fs::read(out.path().join("c.txt")).unwrap(), b"third");
        assert!(!out.path().join("missing.txt").exists());

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn progress_matches_worked_example() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("two_meg.bin"), vec![0x42u8; 2_000_000]).unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let mut percents = Vec::new();
        client
            .download("two_meg.bin", out.path(), |p| {
                percents.push(p.percent());
            })
            .await
            .unwrap();

        // 2,000,000 bytes in chunks [1,048,576; 951,424].
        let rounded: Vec<f64> = percents.iter().map(|p| (p * 10.0).round() / 10.0).collect();
        assert_eq!(rounded, [52.4, 100.0]);
        assert!(percents[0] > 0.0);
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*percents.last().unwrap(), 100.0);

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    #[tokio::test]
    async fn seeded_samples_are_downloadable() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        samples::seed(root.path()).await.unwrap();

        let server = TestServer::start(root.path()).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let files = client.list_files().await.unwrap();
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        assert_eq!(
            names,
            ["large_file.txt", "medium_file.txt", "small_file.txt"]
        );

        let report = client
            .download_all(&names, out.path(), |_, _| {})
            .await
            .unwrap();
        assert!(report.all_ok());
        for (entry, outcome) in files.iter().zip(&report.files) {
            assert_eq!(entry.size, outcome.bytes);
            assert_eq!(
                std::fs::metadata(out.path().join(&entry.name)).unwrap().len(),
                entry.size
            );
        }

        client.disconnect().await.unwrap();
        server.stop().await;
    }

    /// A server that closes the connection halfway through a chunk's
    /// raw-bytes frame.
    async fn drop_mid_chunk_server(listener: TcpListener) {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);

        let _: Command = read_message(&mut reader, MAX_FRAME_LEN)
            .await
            .unwrap()
            .unwrap();
        write_message(
            &mut writer,
            &Response::FileInfo {
                filename: "victim.bin".into(),
                file_size: 2048,
                num_chunks: 2,
                chunk_size: 1024,
            },
        )
        .await
        .unwrap();
        write_message(
            &mut writer,
            &Response::FileChunk {
                chunk_number: 1,
                total_chunks: 2,
                chunk_size: 1024,
            },
        )
        .await
        .unwrap();
        write_frame(&mut writer, &[0xAA; 1024]).await.unwrap();
        write_message(
            &mut writer,
            &Response::FileChunk {
                chunk_number: 2,
                total_chunks: 2,
                chunk_size: 1024,
            },
        )
        .await
        .unwrap();

        // Half the final raw frame, then hang up.
        writer.write_u32(1024).await.unwrap();
        writer.write_all(&[0xBB; 512]).await.unwrap();
        writer.flush().await.unwrap();
    }

    #[tokio::test]
    async fn mid_chunk_drop_is_an_error_not_a_short_file() {
        let out = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let rogue = tokio::spawn(drop_mid_chunk_server(listener));

        let mut client = DepotClient::connect(addr).await.unwrap();
        let result = client.download("victim.bin", out.path(), |_| {}).await;
        assert!(result.is_err(), "drop mid-chunk must be a hard error");

        // The partial file on disk must not have the declared size.
        let partial = out.path().join("victim.bin");
        if partial.exists() {
            assert!(std::fs::metadata(&partial).unwrap().len() < 2048);
        }

        rogue.await.unwrap();
    }

    /// A server that sends a file's two chunks in the wrong order, then
    /// serves a correct file for the next request on the same stream.
    async fn out_of_order_server(listener: TcpListener) {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut writer = BufWriter::new(writer);

        let _: Command = read_message(&mut reader, MAX_FRAME_LEN)
            .await
            .unwrap()
            .unwrap();

        // First file: headers numbered 2 then 1.
        write_message(
            &mut writer,
            &Response::FileInfo {
                filename: "shuffled.bin".into(),
                file_size: 8,
                num_chunks: 2,
                chunk_size: 4,
            },
        )
        .await
        .unwrap();
        for number in [2u64, 1] {
            write_message(
                &mut writer,
                &Response::FileChunk {
                    chunk_number: number,
                    total_chunks: 2,
                    chunk_size: 4,
                },
            )
            .await
            .unwrap();
            write_frame(&mut writer, b"DATA").await.unwrap();
        }

        // Second file: well-formed.
        write_message(
            &mut writer,
            &Response::FileInfo {
                filename: "fine.bin".into(),
                file_size: 4,
                num_chunks: 1,
                chunk_size: 4,
            },
        )
        .await
        .unwrap();
        write_message(
            &mut writer,
            &Response::FileChunk {
                chunk_number: 1,
                total_chunks: 1,
                chunk_size: 4,
            },
        )
        .await
        .unwrap();
        write_frame(&mut writer, b"GOOD").await.unwrap();
        writer.flush().await.unwrap();
    }

    #[tokio::test]
    async fn out_of_order_chunk_aborts_file_but_not_batch() {
        let out = tempfile::tempdir().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let rogue = tokio::spawn(out_of_order_server(listener));

        let mut client = DepotClient::connect(addr).await.unwrap();
        let names: Vec<String> = ["shuffled.bin", "fine.bin"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let report = client
            .download_all(&names, out.path(), |_, _| {})
            .await
            .unwrap();

        assert!(!report.all_ok());
        assert!(!report.files[0].is_ok());
        assert!(
            report.files[0]
                .error
                .as_deref()
                .unwrap()
                .contains("out-of-order"),
            "got: {:?}",
            report.files[0].error
        );
        // The drained stream lines up for the next file.
        assert!(report.files[1].is_ok());
        assert_eq!(std::fs::read(out.path().join("fine.bin")).unwrap(), b"GOOD");

        rogue.await.unwrap();
    }

    #[tokio::test]
    async fn custom_chunk_size_round_trips() {
        let root = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..10_000usize).map(|i| (i % 256) as u8).collect();
        std::fs::write(root.path().join("data.bin"), &data).unwrap();

        let server = TestServer::start_with_chunk_size(root.path(), 4096).await;
        let mut client = DepotClient::connect(server.addr).await.unwrap();

        let mut chunk_count = 0;
        let outcome = client
            .download("data.bin", out.path(), |_| chunk_count += 1)
            .await
            .unwrap();
        assert!(outcome.is_ok());
        assert_eq!(chunk_count, 3); // ceil(10000 / 4096)
        assert_eq!(std::fs::read(out.path().join("data.bin")).unwrap(), data);

        client.disconnect().await.unwrap();
        server.stop().await;
    }
}
