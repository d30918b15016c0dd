use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;
use tonic::transport::Server;

use ringdns_node::constants::{
    CACHE_SIZE, CHECK_PREDECESSOR_INTERVAL_MS, DEFAULT_PORT, FIX_FINGERS_INTERVAL_MS, LOCALHOST,
    STABILIZE_INTERVAL_MS,
};
use ringdns_node::resolve::DnsResolver;
use ringdns_node::storage::FileStore;
use ringdns_node::transport::GrpcTransport;
use ringdns_node::{Node, NodeConfig};
use ringdns_proto::hash_key;
use ringdns_proto::ring::ring_server::RingServer;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address of a node whose ring to join; omit to create a new ring
    #[arg(short, long, default_value = "")]
    join: String,

    /// Maximum number of cached queries
    #[arg(long, default_value_t = CACHE_SIZE)]
    cache_size: usize,

    /// Stabilize period in milliseconds
    #[arg(long, default_value_t = STABILIZE_INTERVAL_MS)]
    stabilize_ms: u64,

    /// Fix-fingers period in milliseconds
    #[arg(long, default_value_t = FIX_FINGERS_INTERVAL_MS)]
    fix_fingers_ms: u64,

    /// Check-predecessor period in milliseconds
    #[arg(long, default_value_t = CHECK_PREDECESSOR_INTERVAL_MS)]
    check_predecessor_ms: u64,

    /// File receiving resolved records
    #[arg(long, default_value = "ringdns-records.txt")]
    store: String,

    /// Log every inbound peer message
    #[arg(long)]
    logging: bool,
}

fn menu() {
    println!("********************************");
    println!("  1 | fingers   show the finger table");
    println!("  2 | info      show successor and predecessor");
    println!("  query <name>  resolve a name through the ring");
    println!("  m             show this menu");
    println!("********************************");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let addr_str = format!("{}:{}", LOCALHOST, args.port);
    let addr: SocketAddr = addr_str.parse()?;
    let id = hash_key(&addr_str);
    println!("Node starting at {} with id {}", addr_str, id);

    let config = NodeConfig {
        cache_size: args.cache_size,
        stabilize_interval: Duration::from_millis(args.stabilize_ms),
        fix_fingers_interval: Duration::from_millis(args.fix_fingers_ms),
        check_predecessor_interval: Duration::from_millis(args.check_predecessor_ms),
        logging: args.logging,
    };

    let node = Arc::new(Node::new(
        id,
        addr_str,
        config,
        Arc::new(GrpcTransport::new()),
        Arc::new(DnsResolver::new()),
        Arc::new(FileStore::new(args.store)),
    ));

    let server = {
        let node = node.clone();
        tokio::spawn(async move {
            Server::builder()
                .add_service(RingServer::new((*node).clone()))
                .serve(addr)
                .await
        })
    };
    println!("Server listening on {}", addr);

    node.join(&args.join).await?;
    node.spawn_maintenance();

    menu();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "m" => menu(),
            "1" | "fingers" => {
                let state = node.state.read().await;
                for (i, finger) in state.finger_table.iter().enumerate() {
                    println!("> finger[{}]: {} : {}", i, finger.id, finger.addr);
                }
            }
            "2" | "info" => {
                let state = node.state.read().await;
                println!("successor:   {} : {}", state.successor.id, state.successor.addr);
                match &state.predecessor {
                    Some(pred) => println!("predecessor: {} : {}", pred.id, pred.addr),
                    None => println!("predecessor: unknown"),
                }
            }
            other => match other.strip_prefix("query ") {
                Some(name) => {
                    let name = name.trim();
                    match node.query(name).await {
                        Ok(addrs) => {
                            for ip in addrs {
                                println!("> {}. IN A {}", name, ip);
                            }
                        }
                        Err(err) => println!("> {}", err),
                    }
                }
                None => println!("unrecognized command {:?}, m shows the menu", other),
            },
        }
    }

    // stdin closed; keep serving until the process is killed.
    server.await??;
    Ok(())
}
