use clap::{Parser, Subcommand};
use ringdns_proto::ring::ring_client::RingClient;
use ringdns_proto::ring::{RequestMessage, ResponseKind};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address of the node to contact
    #[arg(short, long, default_value = "http://127.0.0.1:5000")]
    node: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the node is alive
    Ping,
    /// Find the node responsible for an identifier
    FindSuccessor { id: u64 },
    /// Show the node's predecessor
    GetPredecessor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut client = RingClient::connect(cli.node).await?;

    match cli.command {
        Commands::Ping => {
            let reply = client.call(RequestMessage::ping()).await?.into_inner();
            if reply.kind() == ResponseKind::Ack {
                println!("alive");
            } else {
                println!("no answer");
            }
        }
        Commands::FindSuccessor { id } => {
            let reply = client
                .call(RequestMessage::find_successor(id))
                .await?
                .into_inner();
            println!("successor: id={}, address={}", reply.node_id, reply.ip);
        }
        Commands::GetPredecessor => {
            let reply = client
                .call(RequestMessage::get_predecessor())
                .await?
                .into_inner();
            if reply.ip.is_empty() {
                println!("predecessor unknown");
            } else {
                println!("predecessor: id={}, address={}", reply.node_id, reply.ip);
            }
        }
    }

    Ok(())
}
