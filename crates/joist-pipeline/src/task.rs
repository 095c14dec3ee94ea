//! Task graph: named build steps composed with sequence and parallel
//! combinators.
//!
//! The graph is built once at startup and never mutated. `run` walks it:
//! a sequence runs children strictly in order, a parallel group starts all
//! children together and fails as soon as any one of them fails.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::pipeline::PipelineError;

type BoxedAction = Pin<Box<dyn Future<Output = Result<(), PipelineError>> + Send>>;
type Action = Arc<dyn Fn() -> BoxedAction + Send + Sync>;

/// A named unit of build work.
#[derive(Clone)]
pub struct Task {
    name: &'static str,
    action: Action,
}

impl Task {
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Failure of a task graph run, naming the leaf task that failed.
#[derive(Debug, thiserror::Error)]
#[error("task '{task}' failed: {source}")]
pub struct TaskError {
    pub task: &'static str,
    #[source]
    pub source: PipelineError,
}

/// A build graph: leaves are tasks, interior nodes order their children.
#[derive(Clone)]
pub enum TaskGraph {
    Leaf(Task),

    /// Children run in order; each waits for its predecessor to complete.
    Sequence(Vec<TaskGraph>),

    /// Children start together; the group completes when all of them do.
    Parallel(Vec<TaskGraph>),
}

/// Wrap an async function into a leaf task.
pub fn task<F, Fut>(name: &'static str, f: F) -> TaskGraph
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), PipelineError>> + Send + 'static,
{
    TaskGraph::Leaf(Task {
        name,
        action: Arc::new(move || Box::pin(f())),
    })
}

/// Run `nodes` one after another.
pub fn sequence(nodes: Vec<TaskGraph>) -> TaskGraph {
    TaskGraph::Sequence(nodes)
}

/// Run `nodes` concurrently.
pub fn parallel(nodes: Vec<TaskGraph>) -> TaskGraph {
    TaskGraph::Parallel(nodes)
}

impl TaskGraph {
    /// Run the graph to completion.
    ///
    /// A sequence stops at the first failing child; later children never
    /// start. A parallel group fails as soon as any child fails, but its
    /// already-started siblings are not cancelled: they keep running detached
    /// on the runtime until they finish on their own.
    pub fn run(self) -> Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send>> {
        Box::pin(async move {
            match self {
                TaskGraph::Leaf(task) => {
                    tracing::debug!("task '{}' starting", task.name);
                    (task.action)()
                        .await
                        .map_err(|source| TaskError {
                            task: task.name,
                            source,
                        })?;
                    tracing::debug!("task '{}' finished", task.name);
                    Ok(())
                }

                TaskGraph::Sequence(nodes) => {
                    for node in nodes {
                        node.run().await?;
                    }
                    Ok(())
                }

                TaskGraph::Parallel(nodes) => {
                    let count = nodes.len();
                    let (tx, mut rx) = mpsc::channel(count.max(1));

                    for node in nodes {
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let _ = tx.send(node.run().await).await;
                        });
                    }
                    drop(tx);

                    for _ in 0..count {
                        match rx.recv().await {
                            Some(Ok(())) => {}
                            Some(Err(e)) => return Err(e),
                            None => break,
                        }
                    }
                    Ok(())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn recording_task(
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    ) -> TaskGraph {
        task(name, move || {
            let log = log.clone();
            async move {
                log.lock().unwrap().push(name);
                Ok(())
            }
        })
    }

    fn failing_task(name: &'static str) -> TaskGraph {
        task(name, || async {
            Err(PipelineError::Clean(std::io::Error::other("boom")))
        })
    }

    #[tokio::test]
    async fn sequence_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let graph = sequence(vec![
            recording_task("first", log.clone()),
            recording_task("second", log.clone()),
            recording_task("third", log.clone()),
        ]);

        graph.run().await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn sequence_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let graph = sequence(vec![
            recording_task("first", log.clone()),
            failing_task("broken"),
            recording_task("never", log.clone()),
        ]);

        let err = graph.run().await.unwrap_err();

        assert_eq!(err.task, "broken");
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn parallel_completes_all_children() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let graph = parallel(vec![
            recording_task("a", log.clone()),
            recording_task("b", log.clone()),
            recording_task("c", log.clone()),
        ]);

        graph.run().await.unwrap();

        let mut ran = log.lock().unwrap().clone();
        ran.sort_unstable();
        assert_eq!(ran, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn parallel_fails_fast_without_cancelling_siblings() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let slow = {
            let log = log.clone();
            task("slow", move || {
                let log = log.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    log.lock().unwrap().push("slow");
                    Ok(())
                }
            })
        };

        let graph = parallel(vec![failing_task("broken"), slow]);

        let err = graph.run().await.unwrap_err();
        assert_eq!(err.task, "broken");

        // The slow sibling was not cancelled; it finishes on its own.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(*log.lock().unwrap(), vec!["slow"]);
    }

    #[tokio::test]
    async fn empty_parallel_group_succeeds() {
        parallel(Vec::new()).run().await.unwrap();
    }

    #[test]
    fn error_names_the_task() {
        let err = TaskError {
            task: "css",
            source: PipelineError::Clean(std::io::Error::other("boom")),
        };

        assert!(err.to_string().contains("css"));
        assert!(err.to_string().contains("boom"));
    }
}
