pub struct Identity {
    pub name: &'static str,
    pub role: &'static str,
    pub location: &'static str,
    pub bio: &'static str,
}

pub struct Card {
    pub title: &'static str,
    pub period: Option<&'static str>,
    pub body: &'static str,
}

pub struct SocialLink {
    pub label: &'static str,
    pub href: &'static str,
    pub external: bool,
}

pub const IDENTITY: Identity = Identity {
    name: "Jerry Wu",
    role: "Software Engineer",
    location: "London, UK",
    bio: "I'm a passionate developer with expertise in building modern web applications. \
          I love creating intuitive and engaging user experiences that solve real-world problems.",
};

pub const SOCIAL_LINKS: [SocialLink; 4] = [
    SocialLink {
        label: "LinkedIn",
        href: "https://www.linkedin.com/in/jerrywu0430",
        external: true,
    },
    SocialLink {
        label: "GitHub",
        href: "https://github.com/JerryWu0430",
        external: true,
    },
    SocialLink {
        label: "Email",
        href: "mailto:woohaoran@gmail.com",
        external: false,
    },
    SocialLink {
        label: "Instagram",
        href: "https://www.instagram.com/jerrywu0430",
        external: true,
    },
];

pub const RESUME_PATH: &str = "/resume.pdf";

pub const ABOUT: [Card; 2] = [
    Card {
        title: "Who I Am",
        period: None,
        body: "I'm a passionate software engineer with a love for creating elegant solutions to complex \
               problems. With a background in computer science and years of industry experience, I specialize \
               in building modern web applications that are both functional and beautiful.",
    },
    Card {
        title: "My Approach",
        period: None,
        body: "I believe in writing clean, maintainable code and creating intuitive user experiences. My \
               approach combines technical expertise with creative problem-solving to deliver solutions that \
               exceed expectations.",
    },
];

pub const EXPERIENCE: [Card; 1] = [Card {
    title: "Senior Developer at TechCorp",
    period: Some("2020 - Present"),
    body: "Led the development of multiple web applications using React, Next.js, and Node.js. Implemented \
           CI/CD pipelines and mentored junior developers. Reduced application load time by 40% through \
           performance optimizations.",
}];

pub const SKILLS: [&str; 8] = [
    "React",
    "Next.js",
    "TypeScript",
    "Node.js",
    "Tailwind CSS",
    "UI/UX Design",
    "GraphQL",
    "AWS",
];

pub const EDUCATION: [Card; 1] = [Card {
    title: "MSc in Computer Science",
    period: Some("Imperial College London, 2018-2020"),
    body: "Specialized in artificial intelligence and web technologies. Graduated with distinction. Thesis on \
           \"Optimizing React Applications for Performance\" received departmental recognition.",
}];

pub const CERTIFICATIONS: [&str; 3] = [
    "AWS Certified Solutions Architect - 2021",
    "Google Cloud Professional Developer - 2022",
    "Speaker at React Conference London - 2023",
];

pub const PROJECTS: [Card; 1] = [Card {
    title: "E-commerce Platform",
    period: None,
    body: "Built a full-stack e-commerce platform using Next.js, TypeScript, and Stripe. Implemented user \
           authentication, product search, cart management, and secure checkout.",
}];

pub const CONTACT: Card = Card {
    title: "Contact Me",
    period: None,
    body: "Interested in working together? Feel free to reach out through any of the social media channels \
           or directly via email.",
};
